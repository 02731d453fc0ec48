use std::collections::BTreeMap;
use std::fmt;

use super::model::QuakeEvent;

// ---------------------------------------------------------------------------
// Filterable attributes
// ---------------------------------------------------------------------------

/// Numeric event attributes that can carry a range predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    Magnitude,
    Depth,
    Duration,
}

impl FilterField {
    pub const ALL: [FilterField; 3] = [FilterField::Magnitude, FilterField::Depth, FilterField::Duration];

    /// Read this attribute off an event.
    pub fn value(self, event: &QuakeEvent) -> f64 {
        match self {
            FilterField::Magnitude => event.magnitude,
            FilterField::Depth => event.depth,
            FilterField::Duration => event.duration,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilterField::Magnitude => "Magnitude",
            FilterField::Depth => "Depth (km)",
            FilterField::Duration => "Duration",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Range predicate and the typed filter configuration
// ---------------------------------------------------------------------------

/// `min <= field <= max`, where a missing bound is open on that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePredicate {
    pub field: FilterField,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangePredicate {
    pub fn new(field: FilterField, min: Option<f64>, max: Option<f64>) -> Self {
        RangePredicate { field, min, max }
    }

    /// Whether the event's value lies inside the range.
    ///
    /// A `NaN` value fails any present bound; with both bounds open the
    /// predicate places no constraint at all.
    pub fn matches(&self, event: &QuakeEvent) -> bool {
        let v = self.field.value(event);
        if let Some(min) = self.min {
            if !(v >= min) {
                return false;
            }
        }
        if let Some(max) = self.max {
            if !(v <= max) {
                return false;
            }
        }
        true
    }
}

/// The set of enabled predicates, combined with AND.
///
/// Built once per user action (apply / clear) and handed to the state by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterConfig {
    predicates: Vec<RangePredicate>,
}

impl FilterConfig {
    /// A configuration with no constraints.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a predicate. A later predicate on the same field replaces the earlier one.
    pub fn with(mut self, predicate: RangePredicate) -> Self {
        self.predicates.retain(|p| p.field != predicate.field);
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[RangePredicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, event: &QuakeEvent) -> bool {
        self.predicates.iter().all(|p| p.matches(event))
    }
}

/// Parse a user-typed bound. Anything that is not a number means "no bound".
pub fn parse_bound(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

// ---------------------------------------------------------------------------
// Filter form: raw widget state for the side panel
// ---------------------------------------------------------------------------

/// Text-field state of one attribute row in the filter panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldInput {
    pub enabled: bool,
    pub min_text: String,
    pub max_text: String,
}

/// Editable widget state. Edits have no effect until turned into a
/// [`FilterConfig`] by [`FilterForm::to_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterForm {
    pub fields: BTreeMap<FilterField, FieldInput>,
}

impl Default for FilterForm {
    fn default() -> Self {
        FilterForm {
            fields: FilterField::ALL
                .iter()
                .map(|&f| (f, FieldInput::default()))
                .collect(),
        }
    }
}

impl FilterForm {
    /// Snapshot the enabled rows into a typed configuration.
    pub fn to_config(&self) -> FilterConfig {
        self.fields
            .iter()
            .filter(|(_, input)| input.enabled)
            .fold(FilterConfig::none(), |cfg, (&field, input)| {
                cfg.with(RangePredicate::new(
                    field,
                    parse_bound(&input.min_text),
                    parse_bound(&input.max_text),
                ))
            })
    }

    pub fn input_mut(&mut self, field: FilterField) -> &mut FieldInput {
        self.fields.entry(field).or_default()
    }

    /// Reset every row to disabled and empty.
    pub fn clear(&mut self) {
        *self = FilterForm::default();
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return indices of events in `year` that pass every predicate, in source order.
pub fn filtered_indices(events: &[QuakeEvent], year: i32, config: &FilterConfig) -> Vec<usize> {
    events
        .iter()
        .enumerate()
        .filter(|(_, ev)| ev.year() == Some(year) && config.matches(ev))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::event;

    fn sample() -> Vec<QuakeEvent> {
        vec![
            event(2019, 12, 31, 5.0, 10.0),
            event(2020, 1, 5, 2.9, 3.0),
            event(2020, 4, 1, 4.1, 35.0),
            event(2021, 1, 1, 4.5, 12.0),
            event(2020, 9, 9, 5.6, 80.0),
            event(2020, 10, 1, f64::NAN, 20.0),
        ]
    }

    #[test]
    fn test_year_only_keeps_order() {
        let events = sample();
        assert_eq!(filtered_indices(&events, 2020, &FilterConfig::none()), vec![1, 2, 4, 5]);
        assert_eq!(filtered_indices(&events, 2019, &FilterConfig::none()), vec![0]);
        assert!(filtered_indices(&events, 1999, &FilterConfig::none()).is_empty());
    }

    #[test]
    fn test_undated_events_never_match() {
        let mut ev = event(2020, 1, 1, 3.0, 1.0);
        ev.time = None;
        assert!(filtered_indices(&[ev], 2020, &FilterConfig::none()).is_empty());
    }

    #[test]
    fn test_magnitude_range_example() {
        let events = vec![
            event(2020, 1, 1, 2.9, 1.0),
            event(2020, 2, 1, 4.1, 1.0),
            event(2020, 3, 1, 5.6, 1.0),
        ];
        let cfg = FilterConfig::none().with(RangePredicate::new(FilterField::Magnitude, Some(4.0), Some(6.0)));
        let out: Vec<f64> = filtered_indices(&events, 2020, &cfg)
            .into_iter()
            .map(|i| events[i].magnitude)
            .collect();
        assert_eq!(out, vec![4.1, 5.6]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let events = vec![event(2020, 1, 1, 4.0, 1.0), event(2020, 1, 2, 6.0, 1.0)];
        let cfg = FilterConfig::none().with(RangePredicate::new(FilterField::Magnitude, Some(4.0), Some(6.0)));
        assert_eq!(filtered_indices(&events, 2020, &cfg), vec![0, 1]);
    }

    #[test]
    fn test_open_bounds() {
        let events = sample();
        let min_only = FilterConfig::none().with(RangePredicate::new(FilterField::Depth, Some(30.0), None));
        assert_eq!(filtered_indices(&events, 2020, &min_only), vec![2, 4]);

        let max_only = FilterConfig::none().with(RangePredicate::new(FilterField::Depth, None, Some(20.0)));
        assert_eq!(filtered_indices(&events, 2020, &max_only), vec![1, 5]);
    }

    #[test]
    fn test_nan_fails_bounded_predicate() {
        let events = sample();
        let cfg = FilterConfig::none().with(RangePredicate::new(FilterField::Magnitude, Some(0.0), None));
        assert_eq!(filtered_indices(&events, 2020, &cfg), vec![1, 2, 4]);

        let mut events = events;
        events[2].duration = f64::NAN;
        let dur = FilterConfig::none().with(RangePredicate::new(FilterField::Duration, None, Some(100.0)));
        assert_eq!(filtered_indices(&events, 2020, &dur), vec![1, 4, 5]);
    }

    #[test]
    fn test_unbounded_predicate_is_no_constraint() {
        let events = sample();
        let cfg = FilterConfig::none().with(RangePredicate::new(FilterField::Magnitude, None, None));
        assert_eq!(
            filtered_indices(&events, 2020, &cfg),
            filtered_indices(&events, 2020, &FilterConfig::none())
        );
    }

    #[test]
    fn test_conjunction_never_widens() {
        let events = sample();
        let mag = RangePredicate::new(FilterField::Magnitude, Some(3.0), None);
        let depth = RangePredicate::new(FilterField::Depth, None, Some(50.0));

        let only_mag = filtered_indices(&events, 2020, &FilterConfig::none().with(mag));
        let only_depth = filtered_indices(&events, 2020, &FilterConfig::none().with(depth));
        let both = filtered_indices(&events, 2020, &FilterConfig::none().with(mag).with(depth));

        assert_eq!(both, vec![2]);
        assert!(both.len() <= only_mag.len());
        assert!(both.len() <= only_depth.len());
        assert!(both.iter().all(|i| only_mag.contains(i) && only_depth.contains(i)));
    }

    #[test]
    fn test_with_replaces_same_field() {
        let cfg = FilterConfig::none()
            .with(RangePredicate::new(FilterField::Depth, Some(1.0), None))
            .with(RangePredicate::new(FilterField::Depth, Some(2.0), None));
        assert_eq!(cfg.predicates().len(), 1);
        assert_eq!(cfg.predicates()[0].min, Some(2.0));
    }

    #[test]
    fn test_parse_bound() {
        assert_eq!(parse_bound(" 4.5 "), Some(4.5));
        assert_eq!(parse_bound("-3"), Some(-3.0));
        assert_eq!(parse_bound(""), None);
        assert_eq!(parse_bound("abc"), None);
        assert_eq!(parse_bound("NaN"), None);
    }

    #[test]
    fn test_form_to_config_skips_disabled_and_garbage() {
        let mut form = FilterForm::default();
        {
            let mag = form.input_mut(FilterField::Magnitude);
            mag.enabled = true;
            mag.min_text = "4".into();
            mag.max_text = "lots".into();
        }
        {
            let depth = form.input_mut(FilterField::Depth);
            depth.enabled = false;
            depth.min_text = "10".into();
        }

        let cfg = form.to_config();
        assert_eq!(
            cfg.predicates(),
            &[RangePredicate::new(FilterField::Magnitude, Some(4.0), None)]
        );

        form.clear();
        assert!(form.to_config().is_empty());
        assert_eq!(form, FilterForm::default());
    }
}
