//! FinDash - Company Finance Dashboard
//!
//! Loads a CSV of simulated company financial indicators and renders
//! descriptive statistics, charts and a regional map.

use eframe::egui;
use findash::gui::FinDashApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("FinDash"),
        ..Default::default()
    };

    eframe::run_native(
        "FinDash",
        options,
        Box::new(|cc| Ok(Box::new(FinDashApp::new(cc)))),
    )
}
