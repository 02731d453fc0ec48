pub mod map;
pub mod panels;
pub mod table;
pub mod timeline;

use crate::config::MapConfig;
use crate::data::model::{QuakeDataset, QuakeEvent};
use crate::view::ViewSink;

use map::MapView;
use table::EventTable;
use timeline::TimelineView;

/// The dashboard's views, fed together so they never disagree.
pub struct DashboardViews {
    pub map: MapView,
    pub timeline: TimelineView,
    pub table: EventTable,
}

impl DashboardViews {
    pub fn new(map_config: &MapConfig) -> Self {
        DashboardViews {
            map: MapView::new(map_config),
            timeline: TimelineView::default(),
            table: EventTable::default(),
        }
    }
}

impl ViewSink for DashboardViews {
    fn render(&mut self, events: &[&QuakeEvent]) {
        self.map.render(events);
        self.timeline.render(events);
        self.table.render(events);
    }

    fn dataset_loaded(&mut self, dataset: &QuakeDataset) {
        self.map.dataset_loaded(dataset);
        self.timeline.dataset_loaded(dataset);
        self.table.dataset_loaded(dataset);
    }

    fn year_selected(&mut self, year: i32) {
        self.map.year_selected(year);
        self.timeline.year_selected(year);
        self.table.year_selected(year);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::event;

    #[test]
    fn test_views_stay_in_lockstep() {
        let mut views = DashboardViews::new(&MapConfig::default());
        let events = [event(2020, 1, 1, 3.0, 5.0), event(2020, 6, 1, 5.0, 9.0)];
        let refs: Vec<&QuakeEvent> = events.iter().collect();

        views.render(&refs);
        assert_eq!(views.map.markers().len(), 2);
        assert_eq!(views.timeline.bars().len(), 2);
        assert_eq!(views.table.rows().len(), 2);

        views.render(&refs[..1]);
        assert_eq!(views.map.markers().len(), 1);
        assert_eq!(views.timeline.bars().len(), 1);
        assert_eq!(views.table.rows().len(), 1);
    }
}
