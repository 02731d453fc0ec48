use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{Datelike, Utc};

use crate::config::ExplorerConfig;
use crate::data::filter::{filtered_indices, FilterConfig, FilterForm};
use crate::data::loader;
use crate::data::model::{QuakeDataset, QuakeEvent};
use crate::playback::{Frame, PlaybackState, PlaybackStepper};
use crate::view::ViewSink;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Every user action is a method here. Each one that changes the selection
/// recomputes `visible_indices` from scratch and pushes the result to `views`.
pub struct AppState<V: ViewSink> {
    config: ExplorerConfig,

    /// Loaded dataset (None until a file loads successfully).
    dataset: Option<QuakeDataset>,

    /// Calendar year currently selected.
    year: i32,

    /// Active predicates, replaced wholesale on apply / clear.
    filters: FilterConfig,

    /// Widget state of the filter panel.
    pub filter_form: FilterForm,

    /// Indices of events passing year + filters (cached).
    visible_indices: Vec<usize>,

    playback: PlaybackStepper,

    /// Render targets.
    pub views: V,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl<V: ViewSink> AppState<V> {
    pub fn new(config: ExplorerConfig, views: V) -> Self {
        let playback = PlaybackStepper::new(&config.playback);
        let year = config.initial_year.unwrap_or_else(|| Utc::now().year());
        AppState {
            config,
            dataset: None,
            year,
            filters: FilterConfig::none(),
            filter_form: FilterForm::default(),
            visible_indices: Vec::new(),
            playback,
            views,
            status_message: None,
        }
    }

    // -- dataset ------------------------------------------------------------

    /// Load a file and make it the dataset. On failure the previous state
    /// (and the views) are left untouched.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} events from {} spanning {:?}",
                    dataset.len(),
                    path.display(),
                    dataset.year_span()
                );
                if dataset.is_empty() {
                    log::warn!("{} contains no events", path.display());
                }
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset: stop playback, clear filters, pick the
    /// starting year and render it in full.
    pub fn set_dataset(&mut self, dataset: QuakeDataset) {
        self.playback.stop();
        self.filters = FilterConfig::none();
        self.filter_form.clear();

        self.year = match (self.config.initial_year, dataset.year_span()) {
            (Some(y), Some((lo, hi))) => y.clamp(lo, hi),
            (None, Some((_, hi))) => hi,
            (Some(y), None) => y,
            (None, None) => self.year,
        };

        self.views.dataset_loaded(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.views.year_selected(self.year);
        self.refilter();
        self.render(Frame::Full);
    }

    pub fn dataset(&self) -> Option<&QuakeDataset> {
        self.dataset.as_ref()
    }

    // -- selection ----------------------------------------------------------

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    /// Number of events in the current selection.
    pub fn visible_len(&self) -> usize {
        self.visible_indices.len()
    }

    /// The current selection, in dataset order.
    #[cfg(test)]
    pub fn visible_events(&self) -> Vec<&QuakeEvent> {
        match &self.dataset {
            Some(ds) => self.visible_indices.iter().map(|&i| &ds.events()[i]).collect(),
            None => Vec::new(),
        }
    }

    pub fn can_step_year(&self, delta: i32) -> bool {
        self.dataset
            .as_ref()
            .and_then(QuakeDataset::year_span)
            .is_some_and(|(lo, hi)| (lo..=hi).contains(&(self.year + delta)))
    }

    pub fn prev_year(&mut self) {
        self.step_year(-1);
    }

    pub fn next_year(&mut self) {
        self.step_year(1);
    }

    fn step_year(&mut self, delta: i32) {
        if self.can_step_year(delta) {
            self.set_year(self.year + delta);
        }
    }

    /// Select a year. Stops any playback and re-renders in full.
    pub fn set_year(&mut self, year: i32) {
        if self.dataset.is_none() {
            return;
        }
        self.year = year;
        self.views.year_selected(year);
        self.selection_changed();
    }

    /// Replace the active predicates. Stops any playback and re-renders in full.
    pub fn apply_filters(&mut self, filters: FilterConfig) {
        self.filters = filters;
        self.selection_changed();
    }

    /// Apply button: snapshot the filter form.
    pub fn apply_filter_form(&mut self) {
        let filters = self.filter_form.to_config();
        self.apply_filters(filters);
    }

    /// Clear button: reset the form and drop every predicate.
    pub fn clear_filters(&mut self) {
        self.filter_form.clear();
        self.apply_filters(FilterConfig::none());
    }

    fn selection_changed(&mut self) {
        if self.playback.state() != PlaybackState::Stopped {
            log::debug!("selection changed during playback, stopping");
        }
        self.playback.stop();
        self.refilter();
        self.render(Frame::Full);
    }

    /// Recompute `visible_indices` after a year or filter change.
    fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds.events(), self.year, &self.filters);
            log::debug!(
                "year {} with {} predicate(s): {} of {} events",
                self.year,
                self.filters.predicates().len(),
                self.visible_indices.len(),
                ds.len()
            );
        }
    }

    /// Push the selection (or a prefix of it) to the views.
    fn render(&mut self, frame: Frame) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let n = match frame {
            Frame::Prefix(n) => n.min(self.visible_indices.len()),
            Frame::Full => self.visible_indices.len(),
        };
        let events: Vec<&QuakeEvent> = self.visible_indices[..n]
            .iter()
            .map(|&i| &ds.events()[i])
            .collect();
        self.views.render(&events);
    }

    // -- playback -----------------------------------------------------------

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn playback_cursor(&self) -> usize {
        self.playback.cursor()
    }

    pub fn interval(&self) -> Duration {
        self.playback.interval()
    }

    pub fn play(&mut self, now: Instant) {
        if self.dataset.is_some() {
            self.playback.play(now);
        }
    }

    pub fn pause(&mut self) {
        self.playback.pause();
    }

    pub fn stop(&mut self) {
        let frame = self.playback.stop();
        self.render(frame);
    }

    pub fn speed_up(&mut self, now: Instant) {
        self.playback.speed_up(now);
    }

    pub fn slow_down(&mut self, now: Instant) {
        self.playback.slow_down(now);
    }

    /// Fire the playback tick if due. Returns whether the views were updated.
    pub fn advance(&mut self, now: Instant) -> bool {
        match self.playback.poll(now, self.visible_indices.len()) {
            Some(frame) => {
                self.render(frame);
                true
            }
            None => false,
        }
    }

    /// Time until the next tick, if playback is running.
    pub fn next_tick_in(&self, now: Instant) -> Option<Duration> {
        self.playback.timer().map(|t| t.remaining(now))
    }
}
