//! Map page: per-region aggregates on a coordinate plot plus the linked
//! summary table.

use egui::{Color32, RichText};
use polars::prelude::DataFrame;

use crate::charts::ChartPlotter;
use crate::data::schema::{self, DEPARTAMENTO, LATITUD, LONGITUD};
use crate::gui::widgets;
use crate::stats::aggregator::{map_center, sorted_by_value};
use crate::stats::RegionSummary;

pub fn show(ui: &mut egui::Ui, df: &DataFrame, summaries: &[RegionSummary]) {
    egui::ScrollArea::vertical()
        .id_salt("map_scroll")
        .show(ui, |ui| {
            ui.heading("🗺 Georreferenciación por Departamento");
            ui.add_space(8.0);

            for required in [DEPARTAMENTO, LATITUD, LONGITUD] {
                if !schema::has_column(df, required) {
                    widgets::warning(
                        ui,
                        &format!("Faltan columnas necesarias para el mapa: '{required}'."),
                    );
                    return;
                }
            }

            if summaries.is_empty() {
                widgets::info(ui, "Ningún registro supera los filtros actuales.");
            }

            // Display order also fixes marker colors between frames.
            let rows = sorted_by_value(summaries);
            ChartPlotter::draw_region_map(ui, &rows, map_center(&rows));
            ui.label(
                RichText::new("💡 Pasa el cursor por un punto para ver sus detalles.")
                    .size(11.0)
                    .color(Color32::GRAY),
            );

            ui.add_space(12.0);
            ui.label(
                RichText::new("Resumen por Departamento")
                    .size(15.0)
                    .strong(),
            );
            ui.add_space(4.0);
            if rows.is_empty() {
                widgets::info(ui, "Sin filas que resumir.");
            } else {
                ChartPlotter::draw_region_table(ui, &rows);
            }
        });
}
