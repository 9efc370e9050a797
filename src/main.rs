//! Superstore Dashboard - Exploratory analysis of the Superstore orders table
//!
//! Loads the orders sheet, cleans it, and walks through loading, cleaning,
//! visualization and outlier detection in a four-step dashboard.

mod charts;
mod config;
mod data;
mod gui;
mod report;
mod stats;

use anyhow::anyhow;
use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;
use gui::DashboardApp;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));
    tracing::info!(
        source = %config.source_path.display(),
        sheet = %config.sheet_name,
        "starting dashboard"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Superstore EDA Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Superstore EDA Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("dashboard window failed: {e}"))
}
