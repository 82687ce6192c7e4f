//! Timeline markers
//!
//! A marker is one timestamped display item: either an action (icon, optional
//! player/job, optional duration band) or a free text label. Markers live in a
//! [`MarkerStore`], which keeps them sorted by timestamp.

mod store;

pub use store::MarkerStore;

use serde::{Deserialize, Serialize};

/// Default band color for actions with a duration (translucent teal)
pub const DEFAULT_DURATION_COLOR: [u8; 4] = [80, 200, 220, 140];

fn default_duration_color() -> [u8; 4] {
    DEFAULT_DURATION_COLOR
}

/// One entry on a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Encounter-relative time in seconds
    pub timestamp_secs: f32,
    #[serde(flatten)]
    pub kind: MarkerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerKind {
    Action(ActionMarker),
    TextLabel { custom_label: String },
}

/// Action-specific marker data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMarker {
    pub action_id: u32,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub job_id: Option<u8>,
    /// Cached icon id, 0 when unresolved
    #[serde(default)]
    pub icon_id: u32,
    /// 0 = instantaneous, >0 draws a duration band
    #[serde(default)]
    pub duration_secs: f32,
    #[serde(default = "default_duration_color")]
    pub duration_color: [u8; 4],
}

impl ActionMarker {
    pub fn new(action_id: u32) -> Self {
        Self {
            action_id,
            player_name: None,
            job_id: None,
            icon_id: 0,
            duration_secs: 0.0,
            duration_color: DEFAULT_DURATION_COLOR,
        }
    }

    pub fn with_player(mut self, name: impl Into<String>, job_id: Option<u8>) -> Self {
        self.player_name = Some(name.into());
        self.job_id = job_id;
        self
    }

    pub fn with_icon(mut self, icon_id: u32) -> Self {
        self.icon_id = icon_id;
        self
    }

    pub fn with_duration(mut self, duration_secs: f32, color: [u8; 4]) -> Self {
        self.duration_secs = duration_secs.max(0.0);
        self.duration_color = color;
        self
    }
}

/// Identity used to decide whether two markers describe the same thing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerIdentity {
    Action { action_id: u32, player_name: Option<String>, half_secs: i64 },
    Text { label: String, half_secs: i64 },
}

impl Marker {
    pub fn action(timestamp_secs: f32, action: ActionMarker) -> Self {
        Self {
            timestamp_secs,
            kind: MarkerKind::Action(action),
        }
    }

    pub fn text(timestamp_secs: f32, label: impl Into<String>) -> Self {
        Self {
            timestamp_secs,
            kind: MarkerKind::TextLabel {
                custom_label: label.into(),
            },
        }
    }

    pub fn as_action(&self) -> Option<&ActionMarker> {
        match &self.kind {
            MarkerKind::Action(action) => Some(action),
            MarkerKind::TextLabel { .. } => None,
        }
    }

    pub fn as_action_mut(&mut self) -> Option<&mut ActionMarker> {
        match &mut self.kind {
            MarkerKind::Action(action) => Some(action),
            MarkerKind::TextLabel { .. } => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            MarkerKind::TextLabel { custom_label } => Some(custom_label),
            MarkerKind::Action(_) => None,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self.kind, MarkerKind::Action(_))
    }

    /// Duration band length, 0 for text labels and instant actions
    pub fn duration_secs(&self) -> f32 {
        self.as_action().map_or(0.0, |a| a.duration_secs.max(0.0))
    }

    /// Time at which the marker's duration band ends
    pub fn end_secs(&self) -> f32 {
        self.timestamp_secs + self.duration_secs()
    }

    /// Identity at half-second resolution, used by conversion pipelines
    pub fn identity(&self) -> MarkerIdentity {
        let half_secs = round_to_half_secs_key(self.timestamp_secs);
        match &self.kind {
            MarkerKind::Action(a) => MarkerIdentity::Action {
                action_id: a.action_id,
                player_name: a.player_name.clone(),
                half_secs,
            },
            MarkerKind::TextLabel { custom_label } => MarkerIdentity::Text {
                label: custom_label.clone(),
                half_secs,
            },
        }
    }
}

/// Round a timestamp to the nearest half second
pub fn round_to_half_secs(secs: f32) -> f32 {
    (secs * 2.0).round() / 2.0
}

/// Integer key for a timestamp rounded to the nearest half second
pub fn round_to_half_secs_key(secs: f32) -> i64 {
    (secs * 2.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_half_secs() {
        assert_eq!(round_to_half_secs(12.2), 12.0);
        assert_eq!(round_to_half_secs(12.3), 12.5);
        assert_eq!(round_to_half_secs(12.76), 13.0);
        assert_eq!(round_to_half_secs_key(12.3), 25);
    }

    #[test]
    fn test_text_marker_has_no_duration() {
        let marker = Marker::text(10.0, "Raidwide");
        assert_eq!(marker.duration_secs(), 0.0);
        assert_eq!(marker.end_secs(), 10.0);
        assert_eq!(marker.label(), Some("Raidwide"));
        assert!(marker.as_action().is_none());
    }

    #[test]
    fn test_identity_collapses_nearby_timestamps() {
        let a = Marker::action(30.1, ActionMarker::new(7431).with_player("Alice", Some(24)));
        let b = Marker::action(29.9, ActionMarker::new(7431).with_player("Alice", Some(24)));
        let c = Marker::action(30.1, ActionMarker::new(7431).with_player("Bob", Some(24)));
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
    }

    #[test]
    fn test_negative_duration_is_clamped() {
        let action = ActionMarker::new(1).with_duration(-3.0, DEFAULT_DURATION_COLOR);
        assert_eq!(action.duration_secs, 0.0);
    }

    #[test]
    fn test_json_shape() {
        let marker = Marker::text(5.0, "Tankbuster");
        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(json["kind"], "text_label");
        assert_eq!(json["custom_label"], "Tankbuster");
        assert_eq!(json["timestamp_secs"], 5.0);
    }

    #[test]
    fn test_action_defaults_when_fields_missing() {
        let marker: Marker =
            serde_json::from_str(r#"{"timestamp_secs": 3.5, "kind": "action", "action_id": 16536, "extra": true}"#)
                .unwrap();
        let action = marker.as_action().unwrap();
        assert_eq!(action.action_id, 16536);
        assert_eq!(action.icon_id, 0);
        assert_eq!(action.player_name, None);
        assert_eq!(action.duration_color, DEFAULT_DURATION_COLOR);
    }
}
