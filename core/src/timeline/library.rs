//! In-memory collection of known timelines.

use std::sync::Arc;

use super::Timeline;

/// All timelines known to the session, in load order.
///
/// Timelines are held behind `Arc` so the playback engine can share the
/// active one without copying its markers.
#[derive(Debug, Clone, Default)]
pub struct TimelineLibrary {
    timelines: Vec<Arc<Timeline>>,
}

impl TimelineLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_timelines(timelines: impl IntoIterator<Item = Timeline>) -> Self {
        let mut library = Self::new();
        for timeline in timelines {
            library.upsert(timeline);
        }
        library
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Timeline>> {
        self.timelines.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Timeline>> {
        self.timelines.iter().find(|t| t.id == id)
    }

    /// Insert or replace a timeline by id. Returns `true` if it replaced one.
    pub fn upsert(&mut self, timeline: Timeline) -> bool {
        let timeline = Arc::new(timeline);
        match self.timelines.iter_mut().find(|t| t.id == timeline.id) {
            Some(slot) => {
                *slot = timeline;
                true
            }
            None => {
                self.timelines.push(timeline);
                false
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<Timeline>> {
        let index = self.timelines.iter().position(|t| t.id == id)?;
        Some(self.timelines.remove(index))
    }

    /// First enabled timeline bound to a territory, in library order
    pub fn for_territory(&self, territory_id: u32) -> Option<&Arc<Timeline>> {
        self.timelines
            .iter()
            .find(|t| t.is_enabled && t.territory_id == territory_id)
    }

    /// Every timeline bound to a territory, enabled or not
    pub fn all_for_territory(&self, territory_id: u32) -> impl Iterator<Item = &Arc<Timeline>> {
        self.timelines
            .iter()
            .filter(move |t| t.territory_id == territory_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(id: &str, territory_id: u32, enabled: bool) -> Timeline {
        let mut t = Timeline::new(id, territory_id, 60.0);
        t.id = id.to_string();
        t.is_enabled = enabled;
        t
    }

    #[test]
    fn test_for_territory_skips_disabled() {
        let library = TimelineLibrary::from_timelines([
            timeline("disabled", 1122, false),
            timeline("enabled", 1122, true),
            timeline("other", 1123, true),
        ]);
        assert_eq!(library.for_territory(1122).unwrap().id, "enabled");
        assert_eq!(library.all_for_territory(1122).count(), 2);
        assert!(library.for_territory(9999).is_none());
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut library = TimelineLibrary::new();
        assert!(!library.upsert(timeline("a", 1, true)));
        assert!(!library.upsert(timeline("b", 1, true)));
        let mut updated = timeline("a", 1, true);
        updated.name = "renamed".to_string();
        assert!(library.upsert(updated));
        assert_eq!(library.len(), 2);
        assert_eq!(library.for_territory(1).unwrap().name, "renamed");
    }

    #[test]
    fn test_remove() {
        let mut library = TimelineLibrary::from_timelines([timeline("a", 1, true)]);
        assert!(library.remove("missing").is_none());
        assert!(library.remove("a").is_some());
        assert!(library.is_empty());
    }
}
