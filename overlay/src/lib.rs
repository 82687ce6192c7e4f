//! Rendering for the Cadence timeline overlay.
//!
//! [`layout`] projects playback state onto screen space for the three
//! timeline layouts. [`overlays::TimelineOverlay`] paints a layout into a
//! software canvas through [`frame::OverlayFrame`].

pub mod colors;
pub mod frame;
pub mod layout;
pub mod overlays;
pub mod utils;

pub use frame::{FrameError, OverlayFrame};
pub use layout::{
    DurationBand, IconRef, JudgementLine, LayoutFrame, PlacedMarker, PlacedText, TextAlign,
    TimelineView, Viewport, header_text, layout_timeline,
};
pub use overlays::TimelineOverlay;
