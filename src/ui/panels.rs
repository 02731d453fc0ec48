use std::time::Instant;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::magnitude_legend;
use crate::data::filter::FilterField;
use crate::playback::PlaybackState;
use crate::state::AppState;
use crate::ui::DashboardViews;

type DashboardState = AppState<DashboardViews>;

// ---------------------------------------------------------------------------
// Left side panel – year, filters, playback
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut DashboardState) {
    ui.heading("Quake Explorer");
    ui.separator();

    if state.dataset().is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            year_controls(ui, state);
            ui.separator();
            filter_controls(ui, state);
            ui.separator();
            playback_controls(ui, state);
            ui.separator();
            legend(ui);
        });
}

fn year_controls(ui: &mut Ui, state: &mut DashboardState) {
    ui.strong("Year");
    ui.horizontal(|ui: &mut Ui| {
        if ui
            .add_enabled(state.can_step_year(-1), egui::Button::new("◀"))
            .clicked()
        {
            state.prev_year();
        }
        ui.label(RichText::new(state.year().to_string()).size(18.0).strong());
        if ui
            .add_enabled(state.can_step_year(1), egui::Button::new("▶"))
            .clicked()
        {
            state.next_year();
        }
    });
}

fn filter_controls(ui: &mut Ui, state: &mut DashboardState) {
    ui.strong("Filters");

    for field in FilterField::ALL {
        let input = state.filter_form.input_mut(field);
        ui.checkbox(&mut input.enabled, field.to_string());
        ui.add_enabled_ui(input.enabled, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut input.min_text)
                        .hint_text("min")
                        .desired_width(60.0),
                );
                ui.label("–");
                ui.add(
                    egui::TextEdit::singleline(&mut input.max_text)
                        .hint_text("max")
                        .desired_width(60.0),
                );
            });
        });
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Apply").clicked() {
            state.apply_filter_form();
        }
        if ui.button("Clear").clicked() {
            state.clear_filters();
        }
    });

    if state.filters().is_empty() {
        ui.small("no filters active");
    } else {
        ui.small(format!("{} filter(s) active", state.filters().predicates().len()));
    }
}

fn playback_controls(ui: &mut Ui, state: &mut DashboardState) {
    ui.strong("Playback");
    let now = Instant::now();

    ui.horizontal(|ui: &mut Ui| {
        let playing = state.playback_state() == PlaybackState::Playing;
        if ui.add_enabled(!playing, egui::Button::new("▶ Play")).clicked() {
            state.play(now);
        }
        if ui.add_enabled(playing, egui::Button::new("⏸ Pause")).clicked() {
            state.pause();
        }
        if ui.button("⏹ Stop").clicked() {
            state.stop();
        }
    });

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Faster").clicked() {
            state.speed_up(now);
        }
        if ui.button("Slower").clicked() {
            state.slow_down(now);
        }
        ui.label(format!("{} ms", state.interval().as_millis()));
    });

    let total = state.visible_len();
    match state.playback_state() {
        PlaybackState::Stopped => ui.small(format!("stopped, {total} events")),
        other => ui.small(format!("{other}: {} / {total}", state.playback_cursor())),
    };
}

fn legend(ui: &mut Ui) {
    ui.strong("Magnitude");
    for (label, color) in magnitude_legend() {
        ui.horizontal(|ui: &mut Ui| {
            ui.colored_label(color, "⏺");
            ui.label(label);
        });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut DashboardState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = state.dataset() {
            ui.label(format!(
                "{} events loaded, {} shown for {}",
                ds.len(),
                state.visible_len(),
                state.year()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut DashboardState) {
    let file = rfd::FileDialog::new()
        .set_title("Open earthquake data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
