use chrono::{Datelike, NaiveDate, Timelike};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Plot};

use crate::color::{depth_shade, magnitude_color};
use crate::data::model::{finite_extent, QuakeDataset, QuakeEvent};
use crate::view::ViewSink;

/// Plot-space length of the deepest depth bar, in magnitude units.
const DEPTH_SPAN: f64 = 3.0;
const BAR_WIDTH: f64 = 0.8;
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One event on the time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBar {
    /// Days since Jan 1 of the event's year, fractional.
    pub day: f64,
    /// Upward bar height; `None` when the magnitude is unknown.
    pub magnitude: Option<f64>,
    /// Downward bar length in plot units; `None` when the depth is unknown.
    pub depth: Option<f64>,
    pub color: Color32,
    pub depth_color: Color32,
}

/// Year-long time axis with magnitude bars above and depth bars below.
///
/// Magnitude heights are linear over `[0, max magnitude of the dataset]` so
/// they compare across years; depth lengths are linear over
/// `[0, max depth of the rendered events]`.
pub struct TimelineView {
    year: Option<i32>,
    magnitude_max: f64,
    depth_max: f64,
    bars: Vec<TimelineBar>,
}

impl Default for TimelineView {
    fn default() -> Self {
        TimelineView {
            year: None,
            magnitude_max: 1.0,
            depth_max: 0.0,
            bars: Vec::new(),
        }
    }
}

impl TimelineView {
    #[cfg(test)]
    pub fn bars(&self) -> &[TimelineBar] {
        &self.bars
    }

    /// Day offsets of each month start in the selected year.
    fn month_starts(&self) -> Vec<f64> {
        let year = self.year.unwrap_or(2001);
        (1..=12)
            .filter_map(|m| NaiveDate::from_ymd_opt(year, m, 1))
            .map(|d| d.ordinal0() as f64)
            .collect()
    }

    fn days_in_year(&self) -> f64 {
        match self.year.and_then(|y| NaiveDate::from_ymd_opt(y, 12, 31)) {
            Some(d) => d.ordinal() as f64,
            None => 365.0,
        }
    }

    /// Draw the timeline into the given ui.
    pub fn show(&self, ui: &mut Ui) {
        let month_starts = self.month_starts();
        let grid_marks: Vec<GridMark> = month_starts
            .iter()
            .map(|&value| GridMark { value, step_size: 30.0 })
            .collect();
        let depth_max = self.depth_max;

        let title = match self.year {
            Some(y) => format!("quake_timeline_{y}"),
            None => "quake_timeline".to_string(),
        };

        let (mag_bars, depth_bars): (Vec<Bar>, Vec<Bar>) = (
            self.bars
                .iter()
                .filter_map(|b| {
                    let m = b.magnitude?;
                    Some(Bar::new(b.day, m).width(BAR_WIDTH).fill(b.color))
                })
                .collect(),
            self.bars
                .iter()
                .filter_map(|b| {
                    let d = b.depth?;
                    Some(Bar::new(b.day, -d).width(BAR_WIDTH).fill(b.depth_color))
                })
                .collect(),
        );

        Plot::new(title)
            .height(ui.available_height())
            .include_x(0.0)
            .include_x(self.days_in_year())
            .include_y(self.magnitude_max)
            .include_y(-DEPTH_SPAN)
            .allow_zoom([true, false])
            .allow_drag([true, false])
            .allow_scroll([true, false])
            .x_grid_spacer(move |_input| grid_marks.clone())
            .x_axis_formatter(move |mark, _range| {
                month_starts
                    .iter()
                    .position(|&s| (s - mark.value).abs() < 0.5)
                    .map(|i| MONTHS[i].to_string())
                    .unwrap_or_default()
            })
            .y_axis_formatter(move |mark, _range| {
                if mark.value >= 0.0 {
                    format!("M{:.1}", mark.value)
                } else if depth_max > 0.0 {
                    format!("{:.0} km", -mark.value / DEPTH_SPAN * depth_max)
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(mag_bars).name("Magnitude"));
                plot_ui.bar_chart(BarChart::new(depth_bars).name("Depth"));
            });
    }
}

/// Fractional days since Jan 1 of the event's own year.
fn day_of_year(event: &QuakeEvent) -> Option<f64> {
    let t = event.time?;
    Some(t.ordinal0() as f64 + t.num_seconds_from_midnight() as f64 / 86_400.0)
}

impl ViewSink for TimelineView {
    fn render(&mut self, events: &[&QuakeEvent]) {
        self.depth_max = finite_extent(events.iter().map(|e| e.depth))
            .map(|(_, hi)| hi.max(0.0))
            .unwrap_or(0.0);
        let depth_max = self.depth_max;

        self.bars = events
            .iter()
            .filter_map(|e| {
                let day = day_of_year(e)?;
                let depth_fraction = if depth_max > 0.0 && e.depth.is_finite() {
                    Some(e.depth.max(0.0) / depth_max)
                } else {
                    None
                };
                Some(TimelineBar {
                    day,
                    magnitude: e.magnitude.is_finite().then(|| e.magnitude.max(0.0)),
                    depth: depth_fraction.map(|f| f * DEPTH_SPAN),
                    color: magnitude_color(e.magnitude),
                    depth_color: depth_shade(depth_fraction.unwrap_or(0.0)),
                })
            })
            .collect();
    }

    fn dataset_loaded(&mut self, dataset: &QuakeDataset) {
        self.magnitude_max = dataset
            .magnitude_extent()
            .map(|(_, hi)| hi)
            .filter(|hi| *hi > 0.0)
            .unwrap_or(1.0);
    }

    fn year_selected(&mut self, year: i32) {
        self.year = Some(year);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::event;

    #[test]
    fn test_render_places_bars_by_day() {
        let mut tl = TimelineView::default();
        let jan = event(2020, 1, 1, 3.5, 10.0);
        let mar = event(2020, 3, 1, 5.0, 40.0);
        tl.render(&[&jan, &mar]);

        let bars = tl.bars();
        assert_eq!(bars.len(), 2);
        // noon on Jan 1
        assert!((bars[0].day - 0.5).abs() < 1e-9);
        // 2020 is a leap year: Mar 1 is day 60 (0-based)
        assert!((bars[1].day - 60.5).abs() < 1e-9);
        assert_eq!(bars[0].magnitude, Some(3.5));
        assert_eq!(bars[1].color, magnitude_color(5.0));
    }

    #[test]
    fn test_depth_scaled_to_rendered_max() {
        let mut tl = TimelineView::default();
        let shallow = event(2020, 1, 1, 3.0, 10.0);
        let deep = event(2020, 1, 2, 3.0, 40.0);
        tl.render(&[&shallow, &deep]);
        assert_eq!(tl.bars()[1].depth, Some(DEPTH_SPAN));
        assert_eq!(tl.bars()[0].depth, Some(DEPTH_SPAN * 0.25));

        // rendering only the shallow one rescales
        tl.render(&[&shallow]);
        assert_eq!(tl.bars()[0].depth, Some(DEPTH_SPAN));
    }

    #[test]
    fn test_unknown_values_skip_bars() {
        let mut tl = TimelineView::default();
        let mut undated = event(2020, 1, 1, 3.0, 1.0);
        undated.time = None;
        let no_mag = event(2020, 1, 1, f64::NAN, f64::NAN);
        tl.render(&[&undated, &no_mag]);

        assert_eq!(tl.bars().len(), 1);
        assert_eq!(tl.bars()[0].magnitude, None);
        assert_eq!(tl.bars()[0].depth, None);
        assert_eq!(tl.bars()[0].color, Color32::GRAY);
    }

    #[test]
    fn test_render_empty_and_idempotent() {
        let mut tl = TimelineView::default();
        let ev = event(2021, 6, 1, 4.0, 5.0);
        tl.render(&[&ev]);
        let first = tl.bars().to_vec();
        tl.render(&[&ev]);
        assert_eq!(tl.bars(), first.as_slice());

        tl.render(&[]);
        assert!(tl.bars().is_empty());
    }

    #[test]
    fn test_dataset_and_year_hooks() {
        let mut tl = TimelineView::default();
        tl.dataset_loaded(&QuakeDataset::from_events(vec![
            event(2020, 1, 1, 6.2, 1.0),
            event(2020, 1, 1, 2.0, 1.0),
        ]));
        assert_eq!(tl.magnitude_max, 6.2);

        tl.year_selected(2020);
        assert_eq!(tl.days_in_year(), 366.0);
        assert_eq!(tl.month_starts()[2], 60.0);

        tl.year_selected(2021);
        assert_eq!(tl.days_in_year(), 365.0);
        assert_eq!(tl.month_starts().len(), 12);
    }
}
