mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod views;

use std::path::PathBuf;

use anyhow::Context;
use app::CarSalesApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load()
        .context("loading dashboard config")?
        .with_data_override(std::env::args_os().nth(1).map(PathBuf::from));

    // A dataset that fails to load leaves the window up with the error
    // shown, so another file can be opened.
    let mut state = AppState::new(config);
    let data_path = state.config.data_path.clone();
    if state.load_path(&data_path).is_err() {
        log::warn!("starting without a dataset");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Used Car Sales Analysis Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(CarSalesApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}
