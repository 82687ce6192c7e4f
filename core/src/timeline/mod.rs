//! Timelines: named, duty-bound, duration-bounded marker collections.

mod library;

pub use library::TimelineLibrary;

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::marker::{ActionMarker, Marker, MarkerStore};

/// Shortest duration a generated timeline is given
pub const MIN_TIMELINE_DURATION_SECS: f32 = 1.0;

/// Padding added after the last marker when a timeline is derived from data
pub const DERIVED_DURATION_PADDING_SECS: f32 = 5.0;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub territory_id: u32,
    /// Total encounter length, always > 0
    pub duration_secs: f32,
    #[serde(default)]
    pub markers: MarkerStore,
    /// Disabled timelines are never auto-activated
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default)]
    pub description: String,
}

static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generate a process-unique, time-ordered timeline id
pub fn generate_id(prefix: &str) -> String {
    let micros = chrono::Utc::now().timestamp_micros();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:x}-{:04x}", prefix, micros, seq & 0xffff)
}

impl Timeline {
    pub fn new(name: impl Into<String>, territory_id: u32, duration_secs: f32) -> Self {
        Self {
            id: generate_id("tl"),
            name: name.into(),
            territory_id,
            duration_secs: sanitize_duration(duration_secs),
            markers: MarkerStore::new(),
            is_enabled: true,
            description: String::new(),
        }
    }

    /// Check the invariants a loaded document must satisfy
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("timeline id is empty".to_string());
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(format!("duration {} is not positive", self.duration_secs));
        }
        if !self.markers.is_sorted() {
            return Err("markers are not sorted".to_string());
        }
        Ok(())
    }

    // ─── Editing ────────────────────────────────────────────────────────────

    pub fn add_action(&mut self, timestamp_secs: f32, action: ActionMarker) -> usize {
        self.markers.insert_sorted(Marker::action(timestamp_secs, action))
    }

    pub fn add_text_label(&mut self, timestamp_secs: f32, label: impl Into<String>) -> usize {
        self.markers.insert_sorted(Marker::text(timestamp_secs, label))
    }

    pub fn remove_marker(&mut self, index: usize) -> Option<Marker> {
        self.markers.remove_at(index)
    }

    /// Retime a marker, clamped to the timeline duration
    pub fn move_marker(&mut self, index: usize, timestamp_secs: f32) -> Option<usize> {
        let clamped = timestamp_secs.clamp(0.0, self.duration_secs);
        self.markers.move_to(index, clamped)
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    /// Shift all markers (e.g. to realign a recording with the pull)
    pub fn shift_all(&mut self, delta_secs: f32) {
        self.markers.shift_all(delta_secs);
    }

    /// Grow the duration so every marker, including duration bands, fits
    pub fn extend_duration_to_fit(&mut self) {
        if let Some(end) = self.markers.last_end()
            && end > self.duration_secs
        {
            self.duration_secs = end;
        }
    }

    pub fn action_count(&self) -> usize {
        self.markers.iter().filter(|m| m.is_action()).count()
    }
}

fn sanitize_duration(duration_secs: f32) -> f32 {
    if duration_secs.is_finite() {
        duration_secs.max(MIN_TIMELINE_DURATION_SECS)
    } else {
        MIN_TIMELINE_DURATION_SECS
    }
}

/// Duration for a timeline derived from recorded or imported data
pub fn derived_duration(observed_secs: f32, last_marker_secs: Option<f32>) -> f32 {
    let from_markers = last_marker_secs.map_or(0.0, |ts| ts + DERIVED_DURATION_PADDING_SECS);
    sanitize_duration(observed_secs.max(from_markers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Timeline {
        let mut timeline = Timeline::new("P1 Savage", 1122, 600.0);
        timeline.add_action(
            30.0,
            ActionMarker::new(7431)
                .with_player("Alice", Some(24))
                .with_icon(2011)
                .with_duration(15.0, [120, 200, 80, 160]),
        );
        timeline.add_text_label(12.5, "Raidwide");
        timeline.add_action(12.5, ActionMarker::new(16536));
        timeline.add_action(45.25, ActionMarker::new(3540).with_player("Bob", None));
        timeline.description = "Mitigation plan".to_string();
        timeline
    }

    #[test]
    fn test_new_sanitizes_duration() {
        assert_eq!(Timeline::new("x", 1, 0.0).duration_secs, MIN_TIMELINE_DURATION_SECS);
        assert_eq!(Timeline::new("x", 1, f32::NAN).duration_secs, MIN_TIMELINE_DURATION_SECS);
        assert_eq!(Timeline::new("x", 1, 90.0).duration_secs, 90.0);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Timeline::new("a", 1, 10.0);
        let b = Timeline::new("b", 1, 10.0);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("tl-"));
    }

    #[test]
    fn test_edits_keep_order() {
        let mut timeline = sample();
        assert!(timeline.markers.is_sorted());
        let moved = timeline.move_marker(0, 700.0).unwrap();
        assert_eq!(moved, timeline.markers.len() - 1);
        assert_eq!(timeline.markers.last_timestamp(), Some(600.0));
        assert!(timeline.markers.is_sorted());
        timeline.shift_all(-20.0);
        assert!(timeline.markers.is_sorted());
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let mut timeline = sample();
        timeline.is_enabled = false;
        let json = serde_json::to_string_pretty(&timeline).unwrap();
        let parsed: Timeline = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, timeline);
    }

    #[test]
    fn test_missing_optional_fields_are_defaulted() {
        let parsed: Timeline =
            serde_json::from_str(r#"{"id": "abc", "duration_secs": 120.0, "future_field": 1}"#)
                .unwrap();
        assert!(parsed.is_enabled);
        assert!(parsed.markers.is_empty());
        assert_eq!(parsed.territory_id, 0);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_duration() {
        let mut timeline = sample();
        timeline.duration_secs = 0.0;
        assert!(timeline.validate().is_err());
        timeline.duration_secs = 10.0;
        timeline.id = "  ".to_string();
        assert!(timeline.validate().is_err());
    }

    #[test]
    fn test_extend_duration_to_fit() {
        let mut timeline = Timeline::new("x", 1, 10.0);
        timeline.add_action(8.0, ActionMarker::new(1).with_duration(5.0, [0; 4]));
        timeline.extend_duration_to_fit();
        assert_eq!(timeline.duration_secs, 13.0);
    }

    #[test]
    fn test_derived_duration() {
        assert_eq!(derived_duration(0.0, None), MIN_TIMELINE_DURATION_SECS);
        assert_eq!(derived_duration(100.0, Some(40.0)), 100.0);
        assert_eq!(derived_duration(30.0, Some(40.0)), 45.0);
    }
}
