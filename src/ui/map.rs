use std::cmp::Reverse;
use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoint, PlotPoints, Points};

use crate::color::magnitude_color;
use crate::config::MapConfig;
use crate::data::model::{QuakeDataset, QuakeEvent};
use crate::view::ViewSink;

/// Smallest magnitude fed to the log scale; lower values get the minimum radius.
const LOG_FLOOR: f64 = 0.1;

const HOVER_COLOR: Color32 = Color32::RED;

// ---------------------------------------------------------------------------
// Radius scale
// ---------------------------------------------------------------------------

/// Logarithmic magnitude → marker radius mapping over the dataset's extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    domain: Option<(f64, f64)>,
    min_radius: f32,
    max_radius: f32,
}

impl RadiusScale {
    pub fn new(domain: Option<(f64, f64)>, config: &MapConfig) -> Self {
        RadiusScale {
            domain,
            min_radius: config.min_marker_radius,
            max_radius: config.max_marker_radius,
        }
    }

    pub fn radius(&self, magnitude: f64) -> f32 {
        let Some((lo, hi)) = self.domain else {
            return self.min_radius;
        };
        if !(magnitude > 0.0) {
            return self.min_radius;
        }
        let lo = lo.max(LOG_FLOOR).ln();
        let hi = hi.max(LOG_FLOOR).ln();
        if hi <= lo {
            return self.min_radius;
        }
        let t = ((magnitude.max(LOG_FLOOR).ln() - lo) / (hi - lo)).clamp(0.0, 1.0) as f32;
        self.min_radius + t * (self.max_radius - self.min_radius)
    }
}

// ---------------------------------------------------------------------------
// Map view sink
// ---------------------------------------------------------------------------

/// One drawn event.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lon: f64,
    pub lat: f64,
    pub radius: f32,
    pub color: Color32,
    pub tooltip: String,
}

/// Markers sharing radius and colour, drawn as a single plot item.
#[derive(Debug, Clone, PartialEq)]
struct MarkerGroup {
    radius: f32,
    color: Color32,
    points: Vec<[f64; 2]>,
}

/// Event markers on a longitude/latitude plane. Pan and zoom are handled by
/// the plot widget; marker radii are in screen points and do not scale with zoom.
pub struct MapView {
    config: MapConfig,
    scale: RadiusScale,
    markers: Vec<Marker>,
    groups: Vec<MarkerGroup>,
}

impl MapView {
    pub fn new(config: &MapConfig) -> Self {
        MapView {
            config: config.clone(),
            scale: RadiusScale::new(None, config),
            markers: Vec::new(),
            groups: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Draw the map into the given ui.
    pub fn show(&self, ui: &mut Ui) {
        let plot = Plot::new("quake_map")
            .data_aspect(1.0)
            .include_x(-180.0)
            .include_x(180.0)
            .include_y(-90.0)
            .include_y(90.0)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .show_grid(true)
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .allow_zoom(true);

        let response = plot.show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(vec![
                    [-180.0, -90.0],
                    [180.0, -90.0],
                    [180.0, 90.0],
                    [-180.0, 90.0],
                    [-180.0, -90.0],
                ]))
                .color(Color32::DARK_GRAY)
                .width(1.0),
            );
            plot_ui.line(
                Line::new(PlotPoints::from(vec![[-180.0, 0.0], [180.0, 0.0]]))
                    .color(Color32::from_gray(90))
                    .width(0.5),
            );

            for group in &self.groups {
                plot_ui.points(
                    Points::new(PlotPoints::from(group.points.clone()))
                        .radius(group.radius)
                        .color(group.color)
                        .filled(true),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(group.points.clone()))
                        .radius(group.radius)
                        .color(Color32::BLACK)
                        .filled(false),
                );
            }

            let pointer = plot_ui.pointer_coordinate()?;
            let pointer_px = plot_ui.screen_from_plot(pointer);
            let hovered = self
                .markers
                .iter()
                .filter_map(|m| {
                    let px = plot_ui.screen_from_plot(PlotPoint::new(m.lon, m.lat));
                    let dist = px.distance(pointer_px);
                    (dist <= m.radius.max(4.0)).then_some((dist, m))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, m)| m)?;

            plot_ui.points(
                Points::new(PlotPoints::from(vec![[hovered.lon, hovered.lat]]))
                    .radius(hovered.radius)
                    .color(HOVER_COLOR)
                    .filled(true),
            );
            Some(hovered.tooltip.clone())
        });

        if let Some(text) = response.inner {
            response.response.on_hover_text_at_pointer(text);
        }
    }
}

impl ViewSink for MapView {
    fn render(&mut self, events: &[&QuakeEvent]) {
        self.markers = events
            .iter()
            .filter(|e| e.has_location())
            .map(|e| Marker {
                lon: e.longitude,
                lat: e.latitude,
                radius: self.scale.radius(e.magnitude),
                color: magnitude_color(e.magnitude),
                tooltip: format!(
                    "Place: {}, Magnitude: {}",
                    e.place.as_deref().unwrap_or("unknown"),
                    e.magnitude
                ),
            })
            .collect();

        // Large markers first so small ones stay visible on top.
        let mut grouped: BTreeMap<(Reverse<u32>, [u8; 4]), MarkerGroup> = BTreeMap::new();
        for m in &self.markers {
            let key = (Reverse((m.radius * 2.0).round() as u32), m.color.to_array());
            grouped
                .entry(key)
                .or_insert_with(|| MarkerGroup {
                    radius: m.radius,
                    color: m.color,
                    points: Vec::new(),
                })
                .points
                .push([m.lon, m.lat]);
        }
        self.groups = grouped.into_values().collect();
    }

    fn dataset_loaded(&mut self, dataset: &QuakeDataset) {
        self.scale = RadiusScale::new(dataset.magnitude_extent(), &self.config);
    }
}
