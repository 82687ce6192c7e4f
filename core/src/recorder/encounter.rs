//! Recorded encounters and their projection onto timelines.

use chrono::NaiveDateTime;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::game_data::{ActionCatalog, is_auto_attack};
use crate::grouping::{DEDUP_WINDOW_SECS, dedupe_by_source};
use crate::marker::{ActionMarker, round_to_half_secs_key};
use crate::timeline::{Timeline, derived_duration};

/// One captured action use, relative to the recording's zero point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedAction {
    pub timestamp_secs: f32,
    /// `None` when the host could not resolve the action
    #[serde(default)]
    pub action_id: Option<u32>,
    pub player_name: String,
    #[serde(default)]
    pub job_id: Option<u8>,
    #[serde(default)]
    pub target_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEncounter {
    pub id: String,
    #[serde(default)]
    pub territory_id: u32,
    pub recorded_at: NaiveDateTime,
    #[serde(default)]
    pub duration_secs: f32,
    /// Party members in order of first appearance
    #[serde(default)]
    pub party_members: Vec<String>,
    #[serde(default)]
    pub is_cleared: bool,
    /// Timeline that was playing during a side-by-side recording
    #[serde(default)]
    pub compared_timeline_id: Option<String>,
    #[serde(default)]
    pub actions: Vec<RecordedAction>,
}

impl RecordedEncounter {
    /// Project the recording onto a new timeline.
    ///
    /// Rapid repeats are collapsed per player first, then every distinct
    /// `(action, player, half-second)` becomes one action marker. Unresolved
    /// actions and auto-attacks are left out.
    pub fn to_timeline(&self, name: impl Into<String>, catalog: &dyn ActionCatalog) -> Timeline {
        let deduped = dedupe_by_source(
            self.actions.iter().collect(),
            DEDUP_WINDOW_SECS,
            |a| a.player_name.as_str(),
            |a| (a.action_id, a.timestamp_secs),
        );

        let mut seen: HashSet<(u32, &str, i64)> = HashSet::new();
        let mut timeline = Timeline::new(name, self.territory_id, 1.0);

        for action in deduped {
            let Some(action_id) = action.action_id else {
                continue;
            };
            if is_auto_attack(action_id) || action.timestamp_secs < 0.0 {
                continue;
            }
            let key = (
                action_id,
                action.player_name.as_str(),
                round_to_half_secs_key(action.timestamp_secs),
            );
            if !seen.insert(key) {
                continue;
            }
            let marker = ActionMarker::new(action_id)
                .with_player(action.player_name.clone(), action.job_id)
                .with_icon(catalog.icon_id(action_id));
            timeline.add_action(action.timestamp_secs, marker);
        }

        timeline.duration_secs =
            derived_duration(self.duration_secs, timeline.markers.last_timestamp());
        timeline.description = format!("Recorded {}", self.recorded_at.format("%Y-%m-%d %H:%M"));
        tracing::debug!(
            recording_id = %self.id,
            markers = timeline.markers.len(),
            "Converted recording to timeline"
        );
        timeline
    }

    /// Number of recorded actions per player, in party order
    pub fn action_counts_by_player(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for action in &self.actions {
            *counts.entry(action.player_name.as_str()).or_default() += 1;
        }

        let mut ordered: Vec<(String, usize)> = self
            .party_members
            .iter()
            .filter_map(|name| counts.remove(name.as_str()).map(|n| (name.clone(), n)))
            .collect();

        // Sources that were not tracked as party members go last, by name
        let mut rest: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, n)| (name.to_string(), n))
            .collect();
        rest.sort();
        ordered.extend(rest);
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_data::StaticActionCatalog;

    fn action(ts: f32, id: Option<u32>, player: &str) -> RecordedAction {
        RecordedAction {
            timestamp_secs: ts,
            action_id: id,
            player_name: player.to_string(),
            job_id: Some(24),
            target_name: None,
        }
    }

    fn encounter(actions: Vec<RecordedAction>) -> RecordedEncounter {
        RecordedEncounter {
            id: "rec-1".to_string(),
            territory_id: 1122,
            recorded_at: NaiveDateTime::parse_from_str("2025-03-01 20:15:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            duration_secs: 90.0,
            party_members: vec!["Alice".to_string(), "Bob".to_string()],
            is_cleared: true,
            compared_timeline_id: None,
            actions,
        }
    }

    #[test]
    fn test_to_timeline_dedupes_and_skips_unknown() {
        let mut catalog = StaticActionCatalog::new();
        catalog.insert(7433, "Plenary Indulgence", 2626);
        let recording = encounter(vec![
            action(1.0, Some(7433), "Alice"),
            action(1.1, Some(7433), "Alice"),
            action(1.2, Some(7433), "Bob"),
            action(2.0, None, "Alice"),
            action(3.0, Some(7), "Bob"),
            action(5.0, Some(7433), "Alice"),
        ]);

        let timeline = recording.to_timeline("Recorded", &catalog);
        let summary: Vec<(f32, Option<&str>, u32)> = timeline
            .markers
            .iter()
            .map(|m| {
                let a = m.as_action().unwrap();
                (m.timestamp_secs, a.player_name.as_deref(), a.icon_id)
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (1.0, Some("Alice"), 2626),
                (1.2, Some("Bob"), 2626),
                (5.0, Some("Alice"), 2626),
            ]
        );
        assert_eq!(timeline.territory_id, 1122);
        assert_eq!(timeline.duration_secs, 90.0);
        assert!(timeline.description.contains("2025-03-01"));
    }

    #[test]
    fn test_to_timeline_collapses_same_half_second() {
        // A no-id usage in between keeps dedup from collapsing these
        let recording = encounter(vec![
            action(10.0, Some(16536), "Alice"),
            action(10.1, None, "Alice"),
            action(10.2, Some(16536), "Alice"),
        ]);
        let timeline = recording.to_timeline("x", &StaticActionCatalog::new());
        assert_eq!(timeline.markers.len(), 1);
    }

    #[test]
    fn test_to_timeline_duration_covers_last_marker() {
        let mut recording = encounter(vec![action(120.0, Some(16536), "Alice")]);
        recording.duration_secs = 0.0;
        let timeline = recording.to_timeline("x", &StaticActionCatalog::new());
        assert_eq!(timeline.duration_secs, 125.0);
    }

    #[test]
    fn test_action_counts_by_player() {
        let recording = encounter(vec![
            action(1.0, Some(1), "Bob"),
            action(2.0, Some(2), "Alice"),
            action(3.0, Some(3), "Bob"),
            action(4.0, Some(4), "Zed"),
        ]);
        assert_eq!(
            recording.action_counts_by_player(),
            vec![
                ("Alice".to_string(), 1),
                ("Bob".to_string(), 2),
                ("Zed".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let parsed: RecordedEncounter = serde_json::from_str(
            r#"{"id": "r", "recorded_at": "2025-03-01T20:15:00", "actions": [
                {"timestamp_secs": 1.5, "player_name": "Alice"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(parsed.actions[0].action_id, None);
        assert!(!parsed.is_cleared);
    }
}
