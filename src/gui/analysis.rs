//! Analysis page: descriptive statistics and distribution charts.
//!
//! Each widget checks for its own columns and degrades to a visible
//! notice when one is missing; a single absent column never takes the
//! whole page down.

use egui::RichText;
use polars::prelude::DataFrame;

use crate::charts::ChartPlotter;
use crate::data::loader;
use crate::data::schema::{self, CATEGORIA, DEPARTAMENTO, VALOR};
use crate::gui::widgets;
use crate::stats::StatsCalculator;

pub fn show(ui: &mut egui::Ui, df: &DataFrame, filtered: &DataFrame) {
    egui::ScrollArea::vertical()
        .id_salt("analysis_scroll")
        .show(ui, |ui| {
            ui.heading("Análisis Descriptivo");
            ui.add_space(8.0);

            general_metrics(ui, df);

            ui.add_space(12.0);
            ui.label(RichText::new("Vista previa").size(15.0).strong());
            ui.add_space(4.0);
            widgets::data_preview_table(ui, df, 10, "analysis_preview");

            ui.add_space(12.0);
            ui.label(
                RichText::new("Estadísticas descriptivas del Valor")
                    .size(15.0)
                    .strong(),
            );
            ui.add_space(4.0);
            value_summary(ui, df);

            ui.add_space(12.0);
            ui.separator();
            ui.label(format!("Registros filtrados: {}", filtered.height()));
            if filtered.height() == 0 {
                widgets::info(ui, "Ningún registro supera los filtros actuales.");
            }
            ui.add_space(8.0);

            ui.label(
                RichText::new("Promedio del Valor por Departamento")
                    .size(15.0)
                    .strong(),
            );
            ui.add_space(4.0);
            region_bar_chart(ui, filtered);

            ui.add_space(14.0);
            ui.label(RichText::new("Distribución del Valor").size(15.0).strong());
            ui.add_space(4.0);
            value_histogram(ui, filtered);

            ui.add_space(14.0);
            ui.label(
                RichText::new("Comparación por Categoría")
                    .size(15.0)
                    .strong(),
            );
            ui.add_space(4.0);
            category_boxplot(ui, filtered);

            ui.add_space(14.0);
            ui.label(
                RichText::new("Matriz de correlaciones")
                    .size(15.0)
                    .strong(),
            );
            ui.add_space(4.0);
            correlation_heatmap(ui, filtered);
            ui.add_space(10.0);
        });
}

fn general_metrics(ui: &mut egui::Ui, df: &DataFrame) {
    let regions = loader::unique_values(df, DEPARTAMENTO).len();
    let categories = loader::unique_values(df, CATEGORIA).len();
    let mean = StatsCalculator::numeric_values(df, VALOR)
        .ok()
        .map(|values| StatsCalculator::summarize(&values).mean);

    ui.horizontal(|ui| {
        widgets::metric(ui, "Registros", &format!("{}", df.height()));
        widgets::metric(ui, "Departamentos", &format!("{regions}"));
        widgets::metric(ui, "Categorías", &format!("{categories}"));
        let mean_text = match mean {
            Some(m) if !m.is_nan() => format!("{m:.3}"),
            _ => "N/A".to_string(),
        };
        widgets::metric(ui, "Promedio del Valor", &mean_text);
    });
}

fn value_summary(ui: &mut egui::Ui, df: &DataFrame) {
    if !schema::has_column(df, VALOR) {
        widgets::warning(ui, "La columna 'Valor' no está disponible en la base.");
        return;
    }
    match StatsCalculator::numeric_values(df, VALOR) {
        Ok(values) if !values.is_empty() => {
            let summary = StatsCalculator::summarize(&values);
            ChartPlotter::draw_value_summary_table(ui, &summary);
        }
        Ok(_) => widgets::info(ui, "La columna 'Valor' no contiene datos numéricos."),
        Err(e) => widgets::warning(ui, &format!("No se pudo resumir 'Valor': {e}")),
    }
}

fn region_bar_chart(ui: &mut egui::Ui, filtered: &DataFrame) {
    if !schema::has_column(filtered, DEPARTAMENTO) || !schema::has_column(filtered, VALOR) {
        widgets::warning(
            ui,
            "No se puede generar el gráfico: faltan 'Departamento' o 'Valor'.",
        );
        return;
    }
    match StatsCalculator::group_summaries(filtered, DEPARTAMENTO, VALOR) {
        Ok(summaries) => {
            let mut means: Vec<(String, f64)> = summaries
                .into_iter()
                .filter(|(_, s)| !s.mean.is_nan())
                .map(|(name, s)| (name, s.mean))
                .collect();
            if means.is_empty() {
                widgets::info(ui, "Sin datos para graficar.");
                return;
            }
            means.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            ChartPlotter::draw_region_bar_chart(ui, &means);
        }
        Err(e) => widgets::warning(ui, &format!("No se pudo agrupar por departamento: {e}")),
    }
}

fn value_histogram(ui: &mut egui::Ui, filtered: &DataFrame) {
    if !schema::has_column(filtered, VALOR) {
        widgets::warning(ui, "No se puede graficar: falta la columna 'Valor'.");
        return;
    }
    match StatsCalculator::numeric_values(filtered, VALOR) {
        Ok(values) if !values.is_empty() => {
            let histogram = StatsCalculator::histogram(&values, 20);
            let density = StatsCalculator::kde_curve(&values, 200);
            ChartPlotter::draw_value_histogram(ui, &histogram, &density, values.len());
        }
        Ok(_) => widgets::info(ui, "Sin datos para graficar."),
        Err(e) => widgets::warning(ui, &format!("No se pudo calcular el histograma: {e}")),
    }
}

fn category_boxplot(ui: &mut egui::Ui, filtered: &DataFrame) {
    if !schema::has_column(filtered, VALOR) || !schema::has_column(filtered, CATEGORIA) {
        widgets::warning(
            ui,
            "No se puede graficar: faltan las columnas 'Valor' y/o 'Categoría'.",
        );
        return;
    }
    match StatsCalculator::values_by_group(filtered, CATEGORIA, VALOR) {
        Ok(groups) if !groups.is_empty() => ChartPlotter::draw_category_boxplot(ui, &groups),
        Ok(_) => widgets::info(ui, "Sin datos para graficar."),
        Err(e) => widgets::warning(ui, &format!("No se pudo agrupar por categoría: {e}")),
    }
}

fn correlation_heatmap(ui: &mut egui::Ui, filtered: &DataFrame) {
    match StatsCalculator::correlation_matrix(filtered) {
        Ok(Some(corr)) => ChartPlotter::draw_correlation_heatmap(ui, &corr),
        Ok(None) => widgets::info(
            ui,
            "No hay columnas numéricas suficientes para calcular correlaciones.",
        ),
        Err(e) => widgets::warning(ui, &format!("No se pudo calcular la matriz: {e}")),
    }
}
