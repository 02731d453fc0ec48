mod app;
mod color;
mod config;
mod data;
mod playback;
mod state;
mod ui;
mod view;

use app::QuakeExplorerApp;
use config::ExplorerConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ExplorerConfig::load_or_default();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Quake Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(QuakeExplorerApp::new(config)))),
    )
}
