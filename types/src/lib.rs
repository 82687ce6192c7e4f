//! Shared configuration types for Cadence.
//!
//! These types are used by the core engine, the overlay layout engine and
//! the replay tool. They carry no behavior beyond defaults and small helpers
//! so that any crate can depend on them without pulling in the engine.

pub mod formatting;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Overlay
// ─────────────────────────────────────────────────────────────────────────────

/// Which layout the timeline overlay projects markers onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineLayout {
    /// Markers scroll right-to-left toward a vertical judgement line
    #[default]
    Horizontal,
    /// Upcoming marker groups as rows, nearest first
    VerticalList,
    /// Markers fall top-to-bottom toward a horizontal judgement line
    VerticalScroll,
}

impl TimelineLayout {
    pub const ALL: [TimelineLayout; 3] = [
        TimelineLayout::Horizontal,
        TimelineLayout::VerticalList,
        TimelineLayout::VerticalScroll,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Horizontal => "Horizontal",
            Self::VerticalList => "Vertical List",
            Self::VerticalScroll => "Vertical Scroll",
        }
    }
}

/// Appearance and windowing settings for the timeline overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOverlayConfig {
    pub layout: TimelineLayout,
    /// Seconds ahead of the current time that are rendered
    pub look_ahead_secs: f32,
    /// Icon edge length at base scale
    pub icon_size: u8,
    /// Maximum rows shown by the vertical list layout
    pub max_list_rows: u8,
    /// Render markers while the pull countdown is still running
    pub show_prepull: bool,
    /// Show the player name under action markers
    pub show_player_names: bool,
    pub background_alpha: u8,
    /// Font scale multiplier (1.0 - 2.0)
    pub font_scale: f32,
    pub judgement_line_color: [u8; 4],
    pub text_label_color: [u8; 4],
    pub placeholder_color: [u8; 4],
    pub european_number_format: bool,
}

impl Default for TimelineOverlayConfig {
    fn default() -> Self {
        Self {
            layout: TimelineLayout::Horizontal,
            look_ahead_secs: 15.0,
            icon_size: 32,
            max_list_rows: 6,
            show_prepull: true,
            show_player_names: false,
            background_alpha: 160,
            font_scale: 1.0,
            judgement_line_color: [255, 220, 80, 255],
            text_label_color: [230, 230, 230, 255],
            placeholder_color: [110, 110, 120, 255],
            european_number_format: false,
        }
    }
}

impl TimelineOverlayConfig {
    /// Look-ahead clamped to a usable range
    pub fn effective_look_ahead(&self) -> f32 {
        self.look_ahead_secs.clamp(1.0, 120.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Playback
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Start playback when combat begins and no countdown was seen
    pub auto_start_on_combat: bool,
    /// Swap the active timeline on territory change
    pub auto_load_by_territory: bool,
    /// Stop playback when combat ends
    pub stop_on_combat_end: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            auto_start_on_combat: true,
            auto_load_by_territory: true,
            stop_on_combat_end: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recorder
// ─────────────────────────────────────────────────────────────────────────────

/// How a recording session picks its zero point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingMode {
    /// Started by hand, timer starts immediately
    #[default]
    Manual,
    /// Started on combat entry, timer starts immediately
    Automatic,
    /// Armed by hand, timer starts at pull (countdown zero or combat start)
    Fresh,
    /// Like `Fresh`, but bound to the timeline being played back
    SideBySide,
}

impl RecordingMode {
    /// Whether the zero point is deferred until a pull signal
    pub fn waits_for_pull(&self) -> bool {
        matches!(self, Self::Fresh | Self::SideBySide)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Begin an `Automatic` recording whenever combat starts
    pub auto_record_on_combat: bool,
    /// Only capture actions used by party members
    pub party_only: bool,
    /// Mode used when a recording is started from the host UI
    pub default_mode: RecordingMode,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            auto_record_on_combat: false,
            party_only: true,
            default_mode: RecordingMode::Manual,
        }
    }
}
