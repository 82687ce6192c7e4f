//! Timeline overlay
//!
//! Renders the playback view with the configured layout. Shapes (background,
//! judgement line, duration bands, icon slots) are painted into the frame;
//! icons and text are left to the host, which reads them from [`layout`].
//!
//! [`layout`]: TimelineOverlay::layout

use cadence_types::{TimelineLayout, TimelineOverlayConfig};

use crate::colors;
use crate::frame::{FrameError, OverlayFrame};
use crate::layout::{IconRef, LayoutFrame, TimelineView, Viewport, layout_timeline};
use crate::utils::color_from_rgba;

/// Base dimensions for scaling calculations, per layout
fn base_size(layout: TimelineLayout) -> (f32, f32) {
    match layout {
        TimelineLayout::Horizontal => (420.0, 110.0),
        TimelineLayout::VerticalList => (260.0, 240.0),
        TimelineLayout::VerticalScroll => (160.0, 360.0),
    }
}

const BASE_ICON_RADIUS: f32 = 3.0;

pub struct TimelineOverlay {
    frame: OverlayFrame,
    config: TimelineOverlayConfig,
    data: TimelineView,
    layout: LayoutFrame,
}

impl TimelineOverlay {
    pub fn new(
        width: u32,
        height: u32,
        config: TimelineOverlayConfig,
        label: &str,
    ) -> Result<Self, FrameError> {
        let (base_width, base_height) = base_size(config.layout);
        let mut frame = OverlayFrame::new(width, height, base_width, base_height)?;
        frame.set_background_alpha(config.background_alpha);
        frame.set_label(label);

        let data = TimelineView::default();
        let layout = layout_timeline(&data, &config, Viewport::new(0.0, 0.0));
        Ok(Self {
            frame,
            config,
            data,
            layout,
        })
    }

    /// Replace the view. Returns `true` if it changed and a re-render is needed.
    pub fn update_data(&mut self, data: TimelineView) -> bool {
        let changed = self.data != data;
        self.data = data;
        changed
    }

    pub fn update_config(&mut self, config: TimelineOverlayConfig) {
        if config.layout != self.config.layout {
            let (base_width, base_height) = base_size(config.layout);
            self.frame.set_base_size(base_width, base_height);
            tracing::debug!(layout = config.layout.label(), "Timeline layout changed");
        }
        self.frame.set_background_alpha(config.background_alpha);
        self.config = config;
    }

    pub fn config(&self) -> &TimelineOverlayConfig {
        &self.config
    }

    pub fn data(&self) -> &TimelineView {
        &self.data
    }

    /// Result of the last [`render`](Self::render)
    pub fn layout(&self) -> &LayoutFrame {
        &self.layout
    }

    pub fn frame(&self) -> &OverlayFrame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut OverlayFrame {
        &mut self.frame
    }

    pub fn render(&mut self) {
        let viewport = Viewport::new(self.frame.width() as f32, self.frame.height() as f32)
            .with_scale(self.frame.scale_factor());
        self.layout = layout_timeline(&self.data, &self.config, viewport);

        // The list only covers its rows; scrolling layouts keep the full track
        if self.config.layout == TimelineLayout::VerticalList {
            let content_height = content_bottom(&self.layout, self.frame.scaled(6.0));
            self.frame.begin_frame_with_content_height(content_height);
        } else {
            self.frame.begin_frame();
        }

        for band in &self.layout.bands {
            self.frame
                .fill_rect(band.x, band.y, band.width, band.height, color_from_rgba(band.color));
        }

        if let Some(line) = self.layout.judgement_line {
            self.frame.draw_line(
                line.x0,
                line.y0,
                line.x1,
                line.y1,
                line.thickness,
                color_from_rgba(line.color),
            );
        }

        let radius = self.frame.scaled(BASE_ICON_RADIUS);
        for marker in &self.layout.markers {
            let half = marker.size / 2.0;
            let fill = match marker.icon {
                IconRef::Icon(_) => colors::icon_slot(),
                IconRef::Placeholder => color_from_rgba(self.config.placeholder_color),
            };
            self.frame.fill_rounded_rect(
                marker.x - half,
                marker.y - half,
                marker.size,
                marker.size,
                radius,
                fill,
            );
            self.frame.stroke_rounded_rect(
                marker.x - half,
                marker.y - half,
                marker.size,
                marker.size,
                radius,
                1.0,
                colors::icon_border(),
            );
        }

        self.frame.end_frame();
    }
}

/// Lowest painted point of the layout plus padding, 0 when nothing is shown
fn content_bottom(layout: &LayoutFrame, padding: f32) -> f32 {
    let markers = layout.markers.iter().map(|m| m.y + m.size / 2.0);
    let texts = layout.header.iter().chain(&layout.texts).map(|t| t.y);
    markers
        .chain(texts)
        .fold(None, |acc: Option<f32>, y| Some(acc.map_or(y, |a| a.max(y))))
        .map_or(0.0, |bottom| bottom + padding)
}
