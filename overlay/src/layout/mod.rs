//! Timeline layout engine
//!
//! Projects the visible markers onto screen space for one of the three
//! [`TimelineLayout`]s. Layout is a pure function of a [`TimelineView`], the
//! overlay config and the viewport; it owns no state and draws nothing. The
//! resulting [`LayoutFrame`] is painted by the overlay frame (shapes) and by
//! the host (icons and text).
//!
//! ```text
//!  Horizontal                         VerticalScroll        VerticalList
//!  ┌──────────────────────────────┐   ┌────────────┐        ┌────────────┐
//!  │ │◄── [A]   [B]        [C]    │   │   [C]      │        │ 3.2  [A][B]│
//!  │ │         [D]                │   │ [B]  [D]   │        │ 12   [C]   │
//!  │ judgement line               │   │   [A]      │        │ 25   Raid  │
//!  └──────────────────────────────┘   │────────────│◄─ line └────────────┘
//! ```

mod horizontal;
mod lanes;
mod vertical_list;
mod vertical_scroll;

use cadence_core::grouping::{GROUP_THRESHOLD_SECS, MarkerGroup, group_markers};
use cadence_core::marker::{Marker, MarkerKind};
use cadence_core::playback::{PlaybackEngine, PlaybackState};
use cadence_types::formatting::{format_countdown, format_encounter_clock};
use cadence_types::{TimelineLayout, TimelineOverlayConfig};

use crate::utils::truncate_name;

// ─────────────────────────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of playback state handed to the overlay once per tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineView {
    pub state: PlaybackState,
    pub timeline_name: Option<String>,
    /// Encounter time in seconds, negative during prepull
    pub current_time: f32,
    /// Markers inside the look-ahead window, in store order
    pub markers: Vec<Marker>,
    /// Markers whose start passed but whose duration band is still running
    pub active_bands: Vec<Marker>,
    /// Seconds left on a detected countdown, if one is running
    pub countdown_remaining: Option<f32>,
}

impl TimelineView {
    pub fn from_engine(
        engine: &PlaybackEngine,
        look_ahead_secs: f32,
        countdown_remaining: Option<f32>,
    ) -> Self {
        Self {
            state: engine.state(),
            timeline_name: engine.timeline().map(|t| t.name.clone()),
            current_time: engine.current_time(),
            markers: engine.visible_markers(look_ahead_secs).to_vec(),
            active_bands: engine.active_duration_markers().cloned().collect(),
            countdown_remaining,
        }
    }

    pub fn is_prepull(&self) -> bool {
        self.state == PlaybackState::Running && self.current_time < 0.0
    }
}

/// Pixel size of the area being laid out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Multiplier applied to every base size
    pub scale: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

/// Which image a placed action shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconRef {
    Icon(u32),
    /// The catalog had no icon for this action
    Placeholder,
}

impl IconRef {
    pub fn from_icon_id(icon_id: u32) -> Self {
        if icon_id == 0 { Self::Placeholder } else { Self::Icon(icon_id) }
    }
}

/// An action marker placed on screen. `x`/`y` is the icon's center.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub action_id: u32,
    pub icon: IconRef,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Seconds until the marker reaches the judgement line
    pub time_until: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Text for the host to draw. `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: [u8; 4],
    pub align: TextAlign,
}

/// Axis-aligned rectangle showing how long an action lasts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationBand {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [u8; 4],
}

/// Line segment the markers travel toward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgementLine {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub thickness: f32,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutFrame {
    pub layout: TimelineLayout,
    pub header: Option<PlacedText>,
    pub judgement_line: Option<JudgementLine>,
    pub bands: Vec<DurationBand>,
    pub markers: Vec<PlacedMarker>,
    pub texts: Vec<PlacedText>,
}

impl LayoutFrame {
    fn empty(layout: TimelineLayout) -> Self {
        Self {
            layout,
            header: None,
            judgement_line: None,
            bands: Vec::new(),
            markers: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.texts.is_empty() && self.bands.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared sizing
// ─────────────────────────────────────────────────────────────────────────────

const BASE_PADDING: f32 = 6.0;
const BASE_GAP: f32 = 4.0;
const BASE_FONT_SIZE: f32 = 12.0;
const BASE_LINE_THICKNESS: f32 = 2.0;
/// Fraction of the icon size used for duration band thickness
const BAND_THICKNESS_RATIO: f32 = 0.4;
const MAX_CAPTION_CHARS: usize = 12;

/// Sizes resolved against the viewport scale
#[derive(Debug, Clone, Copy)]
pub(crate) struct Metrics {
    pub icon: f32,
    pub padding: f32,
    pub gap: f32,
    pub font: f32,
    pub line: f32,
    pub band: f32,
}

impl Metrics {
    fn new(config: &TimelineOverlayConfig, viewport: Viewport) -> Self {
        let scale = viewport.scale.max(0.1);
        let icon = f32::from(config.icon_size.max(8)) * scale;
        Self {
            icon,
            padding: BASE_PADDING * scale,
            gap: BASE_GAP * scale,
            font: BASE_FONT_SIZE * config.font_scale.clamp(1.0, 2.0) * scale,
            line: BASE_LINE_THICKNESS * scale,
            band: icon * BAND_THICKNESS_RATIO,
        }
    }
}

/// Everything a layout variant needs
pub(crate) struct LayoutContext<'a> {
    pub view: &'a TimelineView,
    pub config: &'a TimelineOverlayConfig,
    pub viewport: Viewport,
    pub metrics: Metrics,
    pub look_ahead: f32,
}

impl LayoutContext<'_> {
    /// Visible markers clustered for perpendicular spreading
    pub fn groups(&self) -> Vec<MarkerGroup<'_>> {
        group_markers(&self.view.markers, GROUP_THRESHOLD_SECS)
    }

    pub fn time_until(&self, marker: &Marker) -> f32 {
        marker.timestamp_secs - self.view.current_time
    }

    pub fn text(&self, text: impl Into<String>, x: f32, y: f32, align: TextAlign) -> PlacedText {
        PlacedText {
            text: text.into(),
            x,
            y,
            size: self.metrics.font,
            color: self.config.text_label_color,
            align,
        }
    }

    /// Placed icon for an action marker, `None` for text labels
    pub fn place_action(&self, marker: &Marker, x: f32, y: f32) -> Option<PlacedMarker> {
        let action = marker.as_action()?;
        Some(PlacedMarker {
            action_id: action.action_id,
            icon: IconRef::from_icon_id(action.icon_id),
            x,
            y,
            size: self.metrics.icon,
            time_until: self.time_until(marker),
        })
    }

    /// Caption drawn under an action icon (player name when enabled)
    pub fn caption(&self, marker: &Marker) -> Option<String> {
        match &marker.kind {
            MarkerKind::Action(action) if self.config.show_player_names => action
                .player_name
                .as_deref()
                .map(|name| truncate_name(name, MAX_CAPTION_CHARS)),
            _ => None,
        }
    }

    pub fn european(&self) -> bool {
        self.config.european_number_format
    }
}

/// Header text: the pull countdown during prepull, otherwise the clock
pub fn header_text(view: &TimelineView, european: bool) -> Option<String> {
    match view.state {
        PlaybackState::Running | PlaybackState::Paused if view.current_time < 0.0 => Some(
            format!("Pull in {}", format_countdown(-view.current_time, "0", european)),
        ),
        PlaybackState::Running | PlaybackState::Paused => {
            Some(format_encounter_clock(view.current_time))
        }
        PlaybackState::Idle | PlaybackState::WaitingForCountdown => {
            view.timeline_name.as_ref()?;
            Some(match view.countdown_remaining {
                Some(remaining) => format!("Pull in {}", format_countdown(remaining, "0", european)),
                None => "Waiting for pull".to_string(),
            })
        }
        PlaybackState::Stopped => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Lay out the view with the configured layout
pub fn layout_timeline(
    view: &TimelineView,
    config: &TimelineOverlayConfig,
    viewport: Viewport,
) -> LayoutFrame {
    let mut frame = LayoutFrame::empty(config.layout);
    let metrics = Metrics::new(config, viewport);

    frame.header = header_text(view, config.european_number_format).map(|text| PlacedText {
        text,
        x: metrics.padding,
        y: metrics.padding + metrics.font,
        size: metrics.font,
        color: config.text_label_color,
        align: TextAlign::Left,
    });

    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return frame;
    }
    let hide_markers = view.state != PlaybackState::Running
        || (view.is_prepull() && !config.show_prepull);

    let ctx = LayoutContext {
        view,
        config,
        viewport,
        metrics,
        look_ahead: config.effective_look_ahead(),
    };

    match config.layout {
        TimelineLayout::Horizontal => horizontal::layout(&ctx, &mut frame, hide_markers),
        TimelineLayout::VerticalScroll => vertical_scroll::layout(&ctx, &mut frame, hide_markers),
        TimelineLayout::VerticalList => {
            if !hide_markers {
                vertical_list::layout(&ctx, &mut frame);
            }
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::marker::ActionMarker;

    pub(crate) fn running_view(current_time: f32, markers: Vec<Marker>) -> TimelineView {
        TimelineView {
            state: PlaybackState::Running,
            timeline_name: Some("Test".to_string()),
            current_time,
            markers,
            active_bands: Vec::new(),
            countdown_remaining: None,
        }
    }

    #[test]
    fn test_header_prepull_and_clock() {
        let view = running_view(-5.0, Vec::new());
        assert_eq!(header_text(&view, false).as_deref(), Some("Pull in 5.0"));
        let view = running_view(75.4, Vec::new());
        assert_eq!(header_text(&view, false).as_deref(), Some("1:15"));
    }

    #[test]
    fn test_header_waiting() {
        let mut view = TimelineView {
            timeline_name: Some("P1S".to_string()),
            ..TimelineView::default()
        };
        assert_eq!(header_text(&view, false).as_deref(), Some("Waiting for pull"));
        view.countdown_remaining = Some(12.2);
        assert_eq!(header_text(&view, false).as_deref(), Some("Pull in 12"));
        view.timeline_name = None;
        assert_eq!(header_text(&view, false), None);
    }

    #[test]
    fn test_icon_ref_placeholder() {
        assert_eq!(IconRef::from_icon_id(0), IconRef::Placeholder);
        assert_eq!(IconRef::from_icon_id(405), IconRef::Icon(405));
    }

    #[test]
    fn test_prepull_hidden_when_disabled() {
        let view = running_view(-3.0, vec![Marker::action(0.0, ActionMarker::new(1))]);
        let mut config = TimelineOverlayConfig::default();
        config.show_prepull = false;
        for layout in TimelineLayout::ALL {
            config.layout = layout;
            let frame = layout_timeline(&view, &config, Viewport::new(400.0, 200.0));
            assert!(frame.markers.is_empty(), "{:?}", layout);
        }
        config.show_prepull = true;
        for layout in TimelineLayout::ALL {
            config.layout = layout;
            let frame = layout_timeline(&view, &config, Viewport::new(400.0, 200.0));
            assert_eq!(frame.markers.len(), 1, "{:?}", layout);
        }
    }

    #[test]
    fn test_nothing_placed_unless_running() {
        let mut view = running_view(5.0, vec![Marker::action(6.0, ActionMarker::new(1))]);
        view.state = PlaybackState::Paused;
        let frame = layout_timeline(&view, &TimelineOverlayConfig::default(), Viewport::new(400.0, 200.0));
        assert!(frame.markers.is_empty());
        assert!(frame.header.is_some());
    }

    #[test]
    fn test_zero_viewport() {
        let view = running_view(0.0, vec![Marker::action(1.0, ActionMarker::new(1))]);
        let frame = layout_timeline(&view, &TimelineOverlayConfig::default(), Viewport::new(0.0, 0.0));
        assert!(frame.is_empty());
    }
}
