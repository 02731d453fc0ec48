use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};

// ---------------------------------------------------------------------------
// QuakeEvent – one row of the source table
// ---------------------------------------------------------------------------

/// A single earthquake record.
///
/// Numeric attributes are always `f64`; values that were absent or malformed
/// in the source are stored as `NaN` so range checks reject them naturally.
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeEvent {
    /// Origin time. `None` when the source timestamp could not be parsed;
    /// such events never belong to any year.
    pub time: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: f64,
    /// Hypocentre depth in km.
    pub depth: f64,
    pub duration: f64,
    /// Free-text location description (USGS `place` column).
    pub place: Option<String>,
}

impl QuakeEvent {
    /// Calendar year (UTC) of the origin time.
    pub fn year(&self) -> Option<i32> {
        self.time.map(|t| t.year())
    }

    /// Whether both coordinates are usable for placing a marker.
    pub fn has_location(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl fmt::Display for QuakeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let place = self.place.as_deref().unwrap_or("unknown place");
        match self.time {
            Some(t) => write!(f, "M{:.1} {place} ({})", self.magnitude, t.format("%Y-%m-%d %H:%M")),
            None => write!(f, "M{:.1} {place}", self.magnitude),
        }
    }
}

// ---------------------------------------------------------------------------
// QuakeDataset – the dataset store
// ---------------------------------------------------------------------------

/// The full parsed dataset. Immutable once built; cloning shares the rows.
#[derive(Debug, Clone)]
pub struct QuakeDataset {
    events: Arc<[QuakeEvent]>,
    /// Inclusive range of calendar years present, if any event has a time.
    year_span: Option<(i32, i32)>,
    /// Finite magnitude extent over the whole dataset.
    magnitude_extent: Option<(f64, f64)>,
}

impl QuakeDataset {
    /// Build the store and its summary statistics from loaded events.
    pub fn from_events(events: Vec<QuakeEvent>) -> Self {
        let year_span = events
            .iter()
            .filter_map(QuakeEvent::year)
            .fold(None, |acc: Option<(i32, i32)>, y| match acc {
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
                None => Some((y, y)),
            });
        let magnitude_extent = finite_extent(events.iter().map(|e| e.magnitude));

        QuakeDataset {
            events: events.into(),
            year_span,
            magnitude_extent,
        }
    }

    /// All events, in source order.
    pub fn events(&self) -> &[QuakeEvent] {
        &self.events
    }

    pub fn year_span(&self) -> Option<(i32, i32)> {
        self.year_span
    }

    pub fn magnitude_extent(&self) -> Option<(f64, f64)> {
        self.magnitude_extent
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Min/max over the finite values of an iterator, `None` if there are none.
pub fn finite_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            None => Some((v, v)),
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Event at noon UTC on the given date, with only magnitude/depth set.
    pub(crate) fn event(y: i32, m: u32, d: u32, magnitude: f64, depth: f64) -> QuakeEvent {
        QuakeEvent {
            time: Some(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()),
            latitude: 10.0,
            longitude: 20.0,
            magnitude,
            depth,
            duration: 0.0,
            place: None,
        }
    }

    #[test]
    fn test_year_span_and_extent() {
        let mut undated = event(2000, 1, 1, 9.9, 1.0);
        undated.time = None;
        let ds = QuakeDataset::from_events(vec![
            event(2021, 3, 1, 4.0, 10.0),
            event(2019, 6, 1, f64::NAN, 5.0),
            undated,
            event(2024, 1, 1, 2.5, 1.0),
        ]);
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.year_span(), Some((2019, 2024)));
        // undated rows still count toward magnitude extent, NaN does not
        assert_eq!(ds.magnitude_extent(), Some((2.5, 9.9)));
    }

    #[test]
    fn test_empty_dataset() {
        let ds = QuakeDataset::from_events(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.year_span(), None);
        assert_eq!(ds.magnitude_extent(), None);
    }

    #[test]
    fn test_clone_shares_rows() {
        let ds = QuakeDataset::from_events(vec![event(2020, 1, 1, 3.0, 1.0)]);
        let other = ds.clone();
        assert!(std::ptr::eq(ds.events().as_ptr(), other.events().as_ptr()));
    }
}
