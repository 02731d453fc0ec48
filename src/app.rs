use std::time::Instant;

use eframe::egui;

use crate::config::ExplorerConfig;
use crate::state::AppState;
use crate::ui::{panels, DashboardViews};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct QuakeExplorerApp {
    pub state: AppState<DashboardViews>,
}

impl QuakeExplorerApp {
    /// Build the app and load the configured dataset. A load failure leaves
    /// the views empty and shows the error in the top bar.
    pub fn new(config: ExplorerConfig) -> Self {
        let views = DashboardViews::new(&config.map);
        let data_path = config.data_path.clone();
        let mut state = AppState::new(config, views);
        state.load_path(&data_path);
        Self { state }
    }
}

impl eframe::App for QuakeExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Playback tick ----
        let now = Instant::now();
        self.state.advance(now);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: year, filters, playback ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panels: timeline and event list ----
        egui::TopBottomPanel::bottom("event_table")
            .resizable(true)
            .default_height(160.0)
            .show(ctx, |ui| {
                self.state.views.table.show(ui);
            });

        egui::TopBottomPanel::bottom("timeline")
            .resizable(true)
            .default_height(200.0)
            .show(ctx, |ui| {
                self.state.views.timeline.show(ui);
            });

        // ---- Central panel: map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset().is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a file to explore earthquakes  (File → Open…)");
                });
                return;
            }
            self.state.views.map.show(ui);
        });

        if let Some(wait) = self.state.next_tick_in(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}
