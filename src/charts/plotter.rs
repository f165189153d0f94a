//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use egui::{Align2, Color32, FontId, RichText, Sense};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};

use crate::stats::calculator::{CorrelationMatrix, Histogram, ValueSummary};
use crate::stats::RegionSummary;

/// Bar fill for the per-region mean chart.
pub const BAR_COLOR: Color32 = Color32::from_rgb(70, 130, 180); // Steel blue
/// Bar fill for the value histogram.
pub const HIST_COLOR: Color32 = Color32::from_rgb(240, 128, 128); // Light coral

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Palette color for the n-th series.
    pub fn color_for(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Bar chart of mean value per region. `rows` arrive in display order
    /// (descending mean).
    pub fn draw_region_bar_chart(ui: &mut egui::Ui, rows: &[(String, f64)]) {
        let x_labels: Vec<String> = rows.iter().map(|(name, _)| name.clone()).collect();

        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, (name, mean))| {
                Bar::new(i as f64, *mean)
                    .width(0.6)
                    .fill(BAR_COLOR)
                    .name(name)
            })
            .collect();

        Plot::new("bar_valor_departamento")
            .height(300.0)
            .allow_scroll(false)
            .x_axis_label("Departamento")
            .y_axis_label("Valor promedio")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if mark.value.fract().abs() < 1e-6 && idx < x_labels.len() {
                    x_labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Histogram of the value column with a density overlay. The density
    /// curve is scaled to counts (n · bin width) so both share one y-axis.
    pub fn draw_value_histogram(
        ui: &mut egui::Ui,
        histogram: &Histogram,
        density: &[[f64; 2]],
        sample_size: usize,
    ) {
        let bars: Vec<Bar> = histogram
            .bars
            .iter()
            .map(|&(center, count)| {
                Bar::new(center, count)
                    .width(histogram.bin_width * 0.95)
                    .fill(HIST_COLOR.gamma_multiply(0.8))
            })
            .collect();

        let scale = sample_size as f64 * histogram.bin_width;
        let curve: PlotPoints = density.iter().map(|&[x, d]| [x, d * scale]).collect();

        Plot::new("hist_valor")
            .height(300.0)
            .allow_scroll(false)
            .x_axis_label("Valor")
            .y_axis_label("Frecuencia")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
                if density.len() > 1 {
                    plot_ui.line(Line::new(curve).color(Color32::DARK_RED).width(1.5));
                }
            });
    }

    /// Box plot of values per category with outlier points.
    pub fn draw_category_boxplot(ui: &mut egui::Ui, groups: &[(String, Vec<f64>)]) {
        let x_labels: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();

        Plot::new("box_valor_categoria")
            .height(320.0)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label("Categoría")
            .y_axis_label("Valor")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if mark.value.fract().abs() < 1e-6 && idx < x_labels.len() {
                    x_labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, (name, values)) in groups.iter().enumerate() {
                    if values.is_empty() {
                        continue;
                    }
                    let color = Self::color_for(i);

                    let mut sorted = values.clone();
                    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

                    let q1 = crate::stats::StatsCalculator::percentile(&sorted, 25.0);
                    let median = crate::stats::StatsCalculator::percentile(&sorted, 50.0);
                    let q3 = crate::stats::StatsCalculator::percentile(&sorted, 75.0);
                    let iqr = q3 - q1;
                    let whisker_low = sorted
                        .iter()
                        .copied()
                        .find(|&v| v >= q1 - 1.5 * iqr)
                        .unwrap_or(q1);
                    let whisker_high = sorted
                        .iter()
                        .rev()
                        .copied()
                        .find(|&v| v <= q3 + 1.5 * iqr)
                        .unwrap_or(q3);

                    let box_elem = BoxElem::new(
                        i as f64,
                        BoxSpread::new(whisker_low, q1, median, q3, whisker_high),
                    )
                    .box_width(0.5)
                    .fill(color.gamma_multiply(0.3))
                    .stroke(egui::Stroke::new(1.5, color));

                    plot_ui.box_plot(BoxPlot::new(vec![box_elem]).name(name));

                    // Outliers beyond the whiskers.
                    let outliers: PlotPoints = sorted
                        .iter()
                        .filter(|&&v| v < whisker_low || v > whisker_high)
                        .map(|&v| [i as f64, v])
                        .collect();
                    plot_ui.points(Points::new(outliers).radius(2.5).color(color));
                }
            });
    }

    /// Bubble map of per-region aggregates: one marker at each region's
    /// mean coordinates, radius scaled by record count.
    pub fn draw_region_map(ui: &mut egui::Ui, rows: &[RegionSummary], center: [f64; 2]) {
        let max_count = rows.iter().map(|r| r.conteo).max().unwrap_or(0);

        Plot::new("mapa_departamentos")
            .height(520.0)
            .allow_scroll(false)
            .data_aspect(1.0)
            .legend(Legend::default())
            .x_axis_label("Longitud")
            .y_axis_label("Latitud")
            .include_x(center[1])
            .include_y(center[0])
            .show(ui, |plot_ui| {
                for (i, row) in rows.iter().enumerate() {
                    let radius = if max_count > 0 {
                        6.0 + (row.conteo as f32 / max_count as f32) * 10.0
                    } else {
                        6.0
                    };
                    let label = if row.valor_prom.is_nan() {
                        format!("{} · {} registros", row.departamento, row.conteo)
                    } else {
                        format!(
                            "{} · {} registros · {:.3}",
                            row.departamento, row.conteo, row.valor_prom
                        )
                    };
                    plot_ui.points(
                        Points::new(PlotPoints::from(vec![[row.lon, row.lat]]))
                            .radius(radius)
                            .color(Self::color_for(i).gamma_multiply(0.85))
                            .name(label),
                    );
                }
            });
    }

    /// Correlation heatmap rendered as a colored grid with the coefficient
    /// printed in each cell.
    pub fn draw_correlation_heatmap(ui: &mut egui::Ui, corr: &CorrelationMatrix) {
        const CELL: egui::Vec2 = egui::Vec2::new(72.0, 28.0);
        const LABEL_WIDTH: f32 = 96.0;

        // Column headers.
        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, CELL.y], egui::Label::new(""));
            for label in &corr.labels {
                ui.add_sized(
                    CELL,
                    egui::Label::new(RichText::new(truncate(label, 9)).size(11.0).strong()),
                );
            }
        });

        for (i, label) in corr.labels.iter().enumerate() {
            ui.horizontal(|ui| {
                ui.add_sized(
                    [LABEL_WIDTH, CELL.y],
                    egui::Label::new(RichText::new(truncate(label, 12)).size(11.0).strong()),
                );
                for j in 0..corr.labels.len() {
                    let r = corr.values[i][j];
                    let (rect, response) = ui.allocate_exact_size(CELL, Sense::hover());
                    let fill = heat_color(r);
                    ui.painter().rect_filled(rect, 2.0, fill);
                    let text = if r.is_nan() {
                        "-".to_string()
                    } else {
                        format!("{r:.2}")
                    };
                    ui.painter().text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        text,
                        FontId::proportional(11.0),
                        contrast_color(fill),
                    );
                    response.on_hover_text(format!(
                        "{} × {}",
                        corr.labels[i], corr.labels[j]
                    ));
                }
            });
        }
    }

    /// Table with the eight-number summary of the value column.
    pub fn draw_value_summary_table(ui: &mut egui::Ui, summary: &ValueSummary) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("valor_summary_table")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["N", "Media", "Std", "Mín", "25%", "50%", "75%", "Máx"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        ui.label(RichText::new(summary.count.to_string()).size(11.0));
                        for value in [
                            summary.mean,
                            summary.std,
                            summary.min,
                            summary.q25,
                            summary.median,
                            summary.q75,
                            summary.max,
                        ] {
                            ui.label(RichText::new(format!("{value:.3}")).size(11.0));
                        }
                        ui.end_row();
                    });
            });
    }

    /// Region summary table, in display order (descending mean value).
    pub fn draw_region_table(ui: &mut egui::Ui, rows: &[RegionSummary]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("region_summary_table")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Departamento", "Lat", "Lon", "Conteo", "Valor prom."] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for row in rows {
                            ui.label(RichText::new(&row.departamento).size(11.0));
                            ui.label(RichText::new(format!("{:.4}", row.lat)).size(11.0));
                            ui.label(RichText::new(format!("{:.4}", row.lon)).size(11.0));
                            ui.label(RichText::new(row.conteo.to_string()).size(11.0));
                            let mean = if row.valor_prom.is_nan() {
                                "-".to_string()
                            } else {
                                format!("{:.3}", row.valor_prom)
                            };
                            ui.label(RichText::new(mean).size(11.0));
                            ui.end_row();
                        }
                    });
            });
    }
}

/// Yellow→green→blue scale over [-1, 1].
fn heat_color(r: f64) -> Color32 {
    if r.is_nan() {
        return Color32::from_gray(60);
    }
    let t = ((r + 1.0) / 2.0).clamp(0.0, 1.0) as f32;
    let (from, to, local) = if t < 0.5 {
        (
            Color32::from_rgb(255, 255, 217),
            Color32::from_rgb(65, 182, 196),
            t * 2.0,
        )
    } else {
        (
            Color32::from_rgb(65, 182, 196),
            Color32::from_rgb(8, 29, 88),
            (t - 0.5) * 2.0,
        )
    };
    lerp_color(from, to, local)
}

fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgb(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
}

/// Black or white, whichever reads better on the fill.
fn contrast_color(fill: Color32) -> Color32 {
    let luminance =
        0.299 * fill.r() as f32 + 0.587 * fill.g() as f32 + 0.114 * fill.b() as f32;
    if luminance > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

fn truncate(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let cut: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
