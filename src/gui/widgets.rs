//! Shared dashboard widgets: metric tiles, notices and the data preview.

use egui::{Color32, RichText};
use polars::prelude::DataFrame;

/// A metric tile: large value over a small caption.
pub fn metric(ui: &mut egui::Ui, label: &str, value: &str) {
    egui::Frame::none()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .rounding(5.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new(value).size(20.0).strong());
                ui.label(RichText::new(label).size(11.0).color(Color32::GRAY));
            });
        });
}

/// Non-fatal degraded-widget notice: the widget is skipped, the rest of
/// the page still renders.
pub fn warning(ui: &mut egui::Ui, text: &str) {
    ui.label(
        RichText::new(format!("⚠ {text}"))
            .size(12.0)
            .color(Color32::from_rgb(255, 193, 7)),
    );
}

/// Informational notice (e.g. empty filter results).
pub fn info(ui: &mut egui::Ui, text: &str) {
    ui.label(
        RichText::new(format!("ℹ {text}"))
            .size(12.0)
            .color(Color32::GRAY),
    );
}

/// First `rows` records as a striped table with horizontal scrolling.
pub fn data_preview_table(ui: &mut egui::Ui, df: &DataFrame, rows: usize, id: &str) {
    let columns = df.get_columns();
    let n = rows.min(df.height());

    egui::ScrollArea::horizontal()
        .id_salt(id.to_string())
        .show(ui, |ui| {
            egui::Grid::new(format!("{id}_grid"))
                .striped(true)
                .min_col_width(70.0)
                .spacing([12.0, 3.0])
                .show(ui, |ui| {
                    for col in columns {
                        ui.label(RichText::new(col.name().as_str()).strong().size(11.0));
                    }
                    ui.end_row();

                    for i in 0..n {
                        for col in columns {
                            let text = col
                                .as_materialized_series()
                                .get(i)
                                .map(|v| {
                                    if v.is_null() {
                                        "-".to_string()
                                    } else {
                                        v.to_string().trim_matches('"').to_string()
                                    }
                                })
                                .unwrap_or_else(|_| "-".to_string());
                            ui.label(RichText::new(text).size(11.0));
                        }
                        ui.end_row();
                    }
                });
        });

    if df.height() > n {
        ui.label(
            RichText::new(format!("… {} registros en total", df.height()))
                .size(10.0)
                .color(Color32::GRAY),
        );
    }
}
