//! Complete overlay implementations
//!
//! Each overlay owns an [`OverlayFrame`](crate::frame::OverlayFrame) for its
//! chrome and canvas, accepts data through `update_data` (returning whether a
//! re-render is needed) and paints on `render`.

mod timeline;

pub use timeline::TimelineOverlay;
