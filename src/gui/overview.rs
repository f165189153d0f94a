//! Overview page: dataset context, headline metrics and a preview.

use egui::RichText;
use polars::prelude::DataFrame;

use crate::data::loader;
use crate::data::schema::DEPARTAMENTO;
use crate::gui::widgets;

pub fn show(ui: &mut egui::Ui, df: &DataFrame) {
    egui::ScrollArea::vertical()
        .id_salt("overview_scroll")
        .show(ui, |ui| {
            ui.heading("Contexto de la Base de Datos");
            ui.add_space(4.0);
            ui.label(
                "Registros de empresas con su departamento, coordenadas, categoría y un \
                 indicador financiero estimado (Valor). Las páginas de análisis y mapa \
                 resumen este indicador por territorio y tipo de empresa.",
            );
            ui.add_space(10.0);

            let region_count = loader::unique_values(df, DEPARTAMENTO).len();
            ui.horizontal(|ui| {
                widgets::metric(ui, "Filas", &format!("{}", df.height()));
                widgets::metric(ui, "Columnas", &format!("{}", df.width()));
                widgets::metric(ui, "Departamentos", &format!("{region_count}"));
            });

            ui.add_space(12.0);
            ui.label(RichText::new("Vista previa").size(15.0).strong());
            ui.add_space(4.0);
            widgets::data_preview_table(ui, df, 50, "overview_preview");
        });
}
