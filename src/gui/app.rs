//! FinDash Main Application
//! Main window with the control panel and the dashboard pages.

use egui::SidePanel;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;

use crate::data::schema::{CATEGORIA, DEPARTAMENTO};
use crate::data::{cache::DatasetCache, filter, loader, FilterSpec};
use crate::gui::control_panel::{ControlPanel, ControlPanelAction, UserSettings};
use crate::gui::{analysis, map_view, overview};
use crate::stats::{aggregator, RegionSummary};

const SETTINGS_KEY: &str = "findash_settings";

/// CSV loading result from the background thread.
enum LoadResult {
    Progress(String),
    Complete { df: DataFrame },
    Error(String),
}

/// Dashboard pages.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Page {
    Overview,
    Analysis,
    Map,
}

/// Main application window.
pub struct FinDashApp {
    cache: DatasetCache,
    control_panel: ControlPanel,
    page: Page,

    dataset: Option<Arc<DataFrame>>,
    /// Records surviving the current filters; rebuilt on filter change.
    filtered: Option<DataFrame>,
    /// Per-region aggregates; rebuilt on filter change.
    summaries: Vec<RegionSummary>,
    /// A fatal load failure; the page renders nothing else until a new
    /// load succeeds.
    load_error: Option<String>,

    load_rx: Option<Receiver<LoadResult>>,
    pending_path: Option<PathBuf>,
    is_loading: bool,
}

impl FinDashApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut settings: UserSettings = cc
            .storage
            .and_then(|storage| storage.get_string(SETTINGS_KEY))
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        // The host may hand a dataset path on the command line; it takes
        // precedence over the remembered one.
        if let Some(arg) = std::env::args().nth(1) {
            settings.csv_path = PathBuf::from(arg);
        }

        let mut app = Self {
            cache: DatasetCache::new(),
            control_panel: ControlPanel {
                settings,
                ..ControlPanel::default()
            },
            page: Page::Overview,
            dataset: None,
            filtered: None,
            summaries: Vec::new(),
            load_error: None,
            load_rx: None,
            pending_path: None,
            is_loading: false,
        };

        if app.control_panel.settings.csv_path.exists() {
            app.start_load();
        } else {
            app.control_panel
                .set_progress(0.0, "Selecciona un archivo CSV para comenzar");
        }

        app
    }

    /// Kick off a (cached or background) load of the configured path.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }
        let path = self.control_panel.settings.csv_path.clone();

        if let Some(df) = self.cache.get(&path) {
            self.install_dataset(df);
            self.control_panel.set_progress(100.0, "Cargado desde caché");
            return;
        }

        self.control_panel.set_progress(5.0, "Cargando archivo CSV...");
        self.is_loading = true;
        self.pending_path = Some(path.clone());

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Leyendo archivo...".to_string()));
            match loader::load_dataset(&path) {
                Ok(df) => {
                    let _ = tx.send(LoadResult::Complete { df });
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Drain background load messages.
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_progress(30.0, &status);
                    }
                    LoadResult::Complete { df } => {
                        let df = match self.pending_path.take() {
                            Some(path) => self.cache.insert(path, df),
                            None => Arc::new(df),
                        };
                        let rows = df.height();
                        let cols = df.width();
                        self.install_dataset(df);
                        self.control_panel.set_progress(
                            100.0,
                            &format!("Cargado: {rows} filas, {cols} columnas"),
                        );
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        log::error!("load failed: {error}");
                        self.dataset = None;
                        self.filtered = None;
                        self.summaries.clear();
                        self.load_error = Some(error.clone());
                        self.pending_path = None;
                        self.control_panel.set_progress(0.0, &format!("Error: {error}"));
                        self.control_panel.export_enabled = false;
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Adopt a loaded dataset: refresh selectable filter values, derived
    /// range bounds and the aggregates.
    fn install_dataset(&mut self, df: Arc<DataFrame>) {
        self.load_error = None;

        let regions = loader::unique_values(&df, DEPARTAMENTO);
        let categories = loader::unique_values(&df, CATEGORIA);
        let bounds = filter::value_bounds(&df);
        self.control_panel
            .update_dataset_info(regions, categories, bounds);

        self.dataset = Some(df);
        self.refresh_derived();
    }

    /// Re-run the filter and aggregation pass over the cached dataset.
    fn refresh_derived(&mut self) {
        let Some(df) = self.dataset.clone() else {
            return;
        };
        let spec: FilterSpec = self.control_panel.filter_spec();

        match spec.apply(&df) {
            Ok(filtered) => {
                log::debug!("filters kept {} of {} rows", filtered.height(), df.height());
                self.filtered = Some(filtered);
            }
            Err(e) => {
                log::error!("filtering failed: {e}");
                self.control_panel.set_progress(0.0, &format!("Error: {e}"));
                self.filtered = None;
            }
        }

        match aggregator::aggregate(&df, &spec) {
            Ok(rows) => self.summaries = rows,
            Err(e) => {
                log::error!("aggregation failed: {e}");
                self.control_panel.set_progress(0.0, &format!("Error: {e}"));
                self.summaries.clear();
            }
        }
    }

    /// Let the user pick a new source file.
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .pick_file()
        {
            self.control_panel.settings.csv_path = path;
            self.start_load();
        }
    }

    /// Drop the cache entry for the current path and re-read the file.
    fn handle_reload(&mut self) {
        if self.is_loading {
            return;
        }
        let path = self.control_panel.settings.csv_path.clone();
        self.cache.invalidate(&path);
        self.start_load();
    }

    /// Write the region summary table to a CSV chosen by the user.
    fn handle_export_summary(&mut self) {
        if self.summaries.is_empty() {
            self.control_panel.set_progress(0.0, "Sin resumen que exportar");
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name("resumen_departamentos.csv")
            .save_file()
        else {
            return;
        };

        match write_summary(&path, &self.summaries) {
            Ok(rows) => {
                log::info!("exported {rows} summary rows to {}", path.display());
                self.control_panel
                    .set_progress(100.0, &format!("Resumen exportado: {rows} filas"));
            }
            Err(e) => {
                log::error!("export failed: {e}");
                self.control_panel.set_progress(0.0, &format!("Error: {e}"));
            }
        }
    }
}

fn write_summary(path: &std::path::Path, rows: &[RegionSummary]) -> anyhow::Result<usize> {
    let mut frame = aggregator::summary_frame(rows)?;
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut frame)?;
    Ok(frame.height())
}

impl eframe::App for FinDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - controls and filters
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(330.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::ReloadCsv => self.handle_reload(),
                        ControlPanelAction::FiltersChanged => self.refresh_derived(),
                        ControlPanelAction::ExportSummary => self.handle_export_summary(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - dashboard pages
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = &self.load_error {
                ui.add_space(40.0);
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new("No se pudo cargar la base de datos")
                            .size(18.0)
                            .color(egui::Color32::from_rgb(220, 53, 69)),
                    );
                    ui.add_space(6.0);
                    ui.label(error);
                    ui.add_space(6.0);
                    ui.label("Verifica el archivo CSV e intenta de nuevo.");
                });
                return;
            }

            let Some(df) = self.dataset.clone() else {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Sin datos").size(20.0));
                });
                return;
            };

            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.page, Page::Overview, "🏠 Contexto");
                ui.selectable_value(&mut self.page, Page::Analysis, "📊 Análisis");
                ui.selectable_value(&mut self.page, Page::Map, "🗺 Mapa");
            });
            ui.separator();

            match self.page {
                Page::Overview => overview::show(ui, &df),
                Page::Analysis => {
                    let empty = DataFrame::empty();
                    let filtered = self.filtered.as_ref().unwrap_or(&empty);
                    analysis::show(ui, &df, filtered);
                }
                Page::Map => map_view::show(ui, &df, &self.summaries),
            }
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(raw) = serde_json::to_string(&self.control_panel.settings) {
            storage.set_string(SETTINGS_KEY, raw);
        }
    }
}
