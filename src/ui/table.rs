use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::magnitude_color;
use crate::data::model::QuakeEvent;
use crate::view::ViewSink;

const ROW_HEIGHT: f32 = 18.0;

/// Pre-formatted table row.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub time: String,
    pub place: String,
    pub magnitude: f64,
    pub depth: String,
    pub location: String,
}

/// Plain listing of whatever the map and timeline currently show.
#[derive(Default)]
pub struct EventTable {
    rows: Vec<EventRow>,
}

fn fmt_number(v: f64, decimals: usize) -> String {
    if v.is_finite() {
        format!("{v:.decimals$}")
    } else {
        "–".to_string()
    }
}

impl EventTable {
    #[cfg(test)]
    pub fn rows(&self) -> &[EventRow] {
        &self.rows
    }

    pub fn show(&self, ui: &mut Ui) {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .column(Column::auto().at_least(130.0))
            .column(Column::remainder().at_least(160.0))
            .column(Column::auto().at_least(40.0))
            .column(Column::auto().at_least(60.0))
            .column(Column::auto().at_least(110.0))
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for title in ["Time (UTC)", "Place", "Mag", "Depth", "Lat / Lon"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, self.rows.len(), |mut row| {
                    let r = &self.rows[row.index()];
                    row.col(|ui| {
                        ui.label(r.time.as_str());
                    });
                    row.col(|ui| {
                        ui.label(r.place.as_str());
                    });
                    row.col(|ui| {
                        ui.label(
                            RichText::new(fmt_number(r.magnitude, 1))
                                .color(magnitude_color(r.magnitude)),
                        );
                    });
                    row.col(|ui| {
                        ui.label(r.depth.as_str());
                    });
                    row.col(|ui| {
                        ui.label(r.location.as_str());
                    });
                });
            });
    }
}

impl ViewSink for EventTable {
    fn render(&mut self, events: &[&QuakeEvent]) {
        self.rows = events
            .iter()
            .map(|e| EventRow {
                time: e
                    .time
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "–".to_string()),
                place: e.place.clone().unwrap_or_default(),
                magnitude: e.magnitude,
                depth: format!("{} km", fmt_number(e.depth, 1)),
                location: format!("{}, {}", fmt_number(e.latitude, 3), fmt_number(e.longitude, 3)),
            })
            .collect();
    }
}
