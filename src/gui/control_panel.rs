//! Control Panel Widget
//! Left side panel with the data source selector and the filter controls.

use egui::{Color32, RichText, ScrollArea};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::data::FilterSpec;

/// Dataset path used when nothing else is configured.
pub const DEFAULT_DATA_PATH: &str = "finanzas_empresas.csv";

/// Settings remembered across runs.
#[derive(Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub csv_path: PathBuf,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }
}

/// Left side control panel: file selection, filters, export and status.
pub struct ControlPanel {
    pub settings: UserSettings,

    pub regions: Vec<String>,
    pub region_selected: Vec<bool>,
    pub categories: Vec<String>,
    pub category_selected: Vec<bool>,

    /// Min/max of the value column; recomputed on every dataset change.
    pub value_bounds: Option<(f64, f64)>,
    pub value_min: f64,
    pub value_max: f64,

    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            regions: Vec::new(),
            region_selected: Vec::new(),
            categories: Vec::new(),
            category_selected: Vec::new(),
            value_bounds: None,
            value_min: 0.0,
            value_max: 0.0,
            progress: 0.0,
            status: "Listo".to_string(),
            export_enabled: false,
        }
    }
}

/// Actions triggered by the control panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    ReloadCsv,
    FiltersChanged,
    ExportSummary,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the selectable values and value bounds of a freshly loaded
    /// dataset. Selections reset to "everything" and the value range to
    /// the data's own bounds.
    pub fn update_dataset_info(
        &mut self,
        regions: Vec<String>,
        categories: Vec<String>,
        value_bounds: Option<(f64, f64)>,
    ) {
        self.region_selected = vec![true; regions.len()];
        self.regions = regions;
        self.category_selected = vec![true; categories.len()];
        self.categories = categories;
        self.value_bounds = value_bounds;
        if let Some((low, high)) = value_bounds {
            self.value_min = low;
            self.value_max = high;
        }
        self.export_enabled = true;
    }

    /// Current selections as a filter spec. A fully checked (or fully
    /// unchecked) list becomes an empty allow-list, i.e. no restriction.
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            regions: allow_list(&self.regions, &self.region_selected),
            categories: allow_list(&self.categories, &self.category_selected),
            value_range: self.value_bounds.map(|_| (self.value_min, self.value_max)),
        }
    }

    /// Draw the control panel.
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("💼 FinDash")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Finanzas Empresariales")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data source =====
        ui.label(RichText::new("📁 Fuente de datos").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
                    ui.label(RichText::new(path_text).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Abrir").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                        if ui.button("⟳").on_hover_text("Recargar el archivo").clicked() {
                            action = ControlPanelAction::ReloadCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters =====
        ui.label(RichText::new("🔧 Filtros").size(14.0).strong());
        ui.add_space(8.0);

        let regions_changed = checklist(
            ui,
            "Departamentos",
            &self.regions,
            &mut self.region_selected,
        );
        ui.add_space(8.0);
        let categories_changed = checklist(
            ui,
            "Categorías",
            &self.categories,
            &mut self.category_selected,
        );
        ui.add_space(8.0);

        let mut range_changed = false;
        if let Some((low, high)) = self.value_bounds {
            ui.label("Rango de Valor:");
            range_changed |= ui
                .add(egui::Slider::new(&mut self.value_min, low..=high).text("mín"))
                .changed();
            range_changed |= ui
                .add(egui::Slider::new(&mut self.value_max, low..=high).text("máx"))
                .changed();
            if self.value_max < self.value_min {
                self.value_max = self.value_min;
            }
        }

        if regions_changed || categories_changed || range_changed {
            action = ControlPanelAction::FiltersChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("📄 Exportar resumen CSV").size(14.0))
                    .min_size(egui::vec2(190.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportSummary;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        ui.label(RichText::new("📊 Estado").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );
        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.progress >= 100.0 {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status.
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Selected values as an allow-list; all or nothing selected means "no
/// restriction" and yields the empty set.
fn allow_list(values: &[String], selected: &[bool]) -> BTreeSet<String> {
    let checked = selected.iter().filter(|&&s| s).count();
    if checked == 0 || checked == values.len() {
        return BTreeSet::new();
    }
    values
        .iter()
        .zip(selected.iter())
        .filter(|(_, &s)| s)
        .map(|(v, _)| v.clone())
        .collect()
}

/// Scrollable checkbox list with select-all / clear-all shortcuts.
/// Returns true when any selection changed.
fn checklist(ui: &mut egui::Ui, title: &str, values: &[String], selected: &mut [bool]) -> bool {
    let mut changed = false;

    ui.label(format!("{title}:"));
    egui::Frame::none()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .rounding(5.0)
        .inner_margin(5.0)
        .show(ui, |ui| {
            ScrollArea::vertical()
                .id_salt(title.to_string())
                .max_height(120.0)
                .show(ui, |ui| {
                    for (i, value) in values.iter().enumerate() {
                        if i < selected.len() {
                            changed |= ui.checkbox(&mut selected[i], value).changed();
                        }
                    }
                });
        });

    ui.horizontal(|ui| {
        if ui.small_button("Todos").clicked() {
            selected.iter_mut().for_each(|v| *v = true);
            changed = true;
        }
        if ui.small_button("Ninguno").clicked() {
            selected.iter_mut().for_each(|v| *v = false);
            changed = true;
        }
    });

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_or_empty_selection_means_no_restriction() {
        let values = vec!["A".to_string(), "B".to_string()];
        assert!(allow_list(&values, &[true, true]).is_empty());
        assert!(allow_list(&values, &[false, false]).is_empty());

        let partial = allow_list(&values, &[true, false]);
        assert_eq!(partial.len(), 1);
        assert!(partial.contains("A"));
    }

    #[test]
    fn test_filter_spec_reflects_bounds() {
        let mut panel = ControlPanel::new();
        assert!(panel.filter_spec().value_range.is_none());

        panel.update_dataset_info(
            vec!["A".to_string()],
            vec!["X".to_string()],
            Some((1.0, 9.0)),
        );
        assert_eq!(panel.filter_spec().value_range, Some((1.0, 9.0)));
        // Everything selected: no allow-list restrictions.
        assert!(panel.filter_spec().regions.is_empty());
        assert!(panel.filter_spec().categories.is_empty());
    }
}
