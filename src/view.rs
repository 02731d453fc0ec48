use crate::data::model::{QuakeDataset, QuakeEvent};

/// A rendering target fed by the application state.
///
/// `render` must accept any sequence, including an empty one, and must fully
/// replace whatever the previous call produced. Calling it twice with the
/// same events leaves the sink as if it had been called once.
pub trait ViewSink {
    fn render(&mut self, events: &[&QuakeEvent]);

    /// A new dataset replaced the old one. Sinks that scale against the
    /// whole dataset (not just the rendered events) pick up their domain here.
    fn dataset_loaded(&mut self, _dataset: &QuakeDataset) {}

    /// The active year changed; called before the next `render`.
    fn year_selected(&mut self, _year: i32) {}
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every render call as the list of magnitudes it received.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) renders: Vec<Vec<f64>>,
        pub(crate) years: Vec<i32>,
        pub(crate) datasets: usize,
    }

    impl RecordingSink {
        pub(crate) fn last(&self) -> Option<&Vec<f64>> {
            self.renders.last()
        }

        pub(crate) fn lengths(&self) -> Vec<usize> {
            self.renders.iter().map(Vec::len).collect()
        }
    }

    impl ViewSink for RecordingSink {
        fn render(&mut self, events: &[&QuakeEvent]) {
            self.renders.push(events.iter().map(|e| e.magnitude).collect());
        }

        fn dataset_loaded(&mut self, _dataset: &QuakeDataset) {
            self.datasets += 1;
        }

        fn year_selected(&mut self, year: i32) {
            self.years.push(year);
        }
    }
}
