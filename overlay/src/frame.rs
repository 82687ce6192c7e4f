//! Overlay frame abstraction
//!
//! `OverlayFrame` owns the software canvas an overlay paints into and the
//! chrome shared by every overlay:
//! - Rounded background with configurable alpha
//! - Border and resize grip while in move mode
//! - Scaling calculations based on canvas size vs. base dimensions
//!
//! The host composites the finished pixmap (plus icons and text from the
//! layout) onto the game window.

use std::fmt;
use std::path::Path;

use tiny_skia::{Color, FillRule, Paint, Path as SkPath, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::colors;

#[derive(Debug)]
pub enum FrameError {
    /// Canvas dimensions must both be non-zero
    InvalidSize { width: u32, height: u32 },
    Encode(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::InvalidSize { width, height } => {
                write!(f, "Invalid overlay size {}x{}", width, height)
            }
            FrameError::Encode(e) => write!(f, "Failed to encode frame: {}", e),
        }
    }
}

impl std::error::Error for FrameError {}

pub struct OverlayFrame {
    pixmap: Pixmap,
    background_alpha: u8,
    base_width: f32,
    base_height: f32,
    /// Optional label the host shows in move mode to identify the overlay
    label: Option<String>,
    move_mode: bool,
}

impl OverlayFrame {
    /// Create a frame with a `width` x `height` canvas.
    ///
    /// `base_width`/`base_height` are the reference dimensions at which the
    /// scale factor is 1.0.
    pub fn new(width: u32, height: u32, base_width: f32, base_height: f32) -> Result<Self, FrameError> {
        let pixmap = Pixmap::new(width, height).ok_or(FrameError::InvalidSize { width, height })?;
        Ok(Self {
            pixmap,
            background_alpha: 180,
            base_width,
            base_height,
            label: None,
            move_mode: false,
        })
    }

    pub fn set_background_alpha(&mut self, alpha: u8) {
        self.background_alpha = alpha;
    }

    pub fn background_alpha(&self) -> u8 {
        self.background_alpha
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_move_mode(&mut self, enabled: bool) {
        self.move_mode = enabled;
    }

    pub fn is_in_move_mode(&self) -> bool {
        self.move_mode
    }

    pub fn set_base_size(&mut self, base_width: f32, base_height: f32) {
        self.base_width = base_width;
        self.base_height = base_height;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scaling
    // ─────────────────────────────────────────────────────────────────────────

    /// Geometric mean of the width and height ratios against the base size
    pub fn scale_factor(&self) -> f32 {
        if self.base_width <= 0.0 || self.base_height <= 0.0 {
            return 1.0;
        }
        let width_ratio = self.width() as f32 / self.base_width;
        let height_ratio = self.height() as f32 / self.base_height;
        (width_ratio * height_ratio).sqrt()
    }

    #[inline]
    pub fn scaled(&self, base_value: f32) -> f32 {
        base_value * self.scale_factor()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Begin a new frame: clear and draw background + border.
    ///
    /// Call this at the start of render(), then draw your content,
    /// then call `end_frame()`.
    pub fn begin_frame(&mut self) {
        let height = self.height() as f32;
        self.begin_frame_with_content_height(height);
    }

    /// Begin a new frame with the background sized to the given content
    /// height instead of the full canvas height.
    ///
    /// In move mode the background always covers the full canvas so the
    /// bounds stay visible.
    pub fn begin_frame_with_content_height(&mut self, content_height: f32) {
        let width = self.width() as f32;
        let height = self.height() as f32;
        let corner_radius = self.scaled(6.0);

        self.pixmap.fill(colors::transparent());

        // Move mode: 20% of normal alpha, at least 20% visible
        let alpha = if self.move_mode {
            (self.background_alpha as f32 * 0.20).round().max(51.0) as u8
        } else {
            self.background_alpha
        };

        if alpha > 0 {
            let bg_height = if self.move_mode { height } else { content_height.min(height) };
            if bg_height > 0.0 {
                self.fill_rounded_rect(0.0, 0.0, width, bg_height, corner_radius, colors::background(alpha));
            }
        }

        if self.move_mode {
            self.stroke_rounded_rect(
                1.0,
                1.0,
                width - 2.0,
                height - 2.0,
                (corner_radius - 1.0).max(0.0),
                2.0,
                colors::frame_border(),
            );
        }
    }

    /// End the frame: draw the resize grip in move mode
    pub fn end_frame(&mut self) {
        if self.move_mode {
            self.draw_resize_indicator();
        }
    }

    /// Filled triangle in the bottom-right corner, drawn as scanlines
    fn draw_resize_indicator(&mut self) {
        let width = self.width() as f32;
        let height = self.height() as f32;
        let indicator_size = self.scaled(16.0).max(16.0);
        let highlight = colors::resize_indicator();

        let num_lines = indicator_size as i32;
        for i in 0..num_lines {
            let line_width = (i + 1) as f32;
            let y = height - indicator_size + i as f32;
            let x = width - line_width;
            self.fill_rect(x, y, line_width, 1.0, highlight);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drawing primitives
    // ─────────────────────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &paint(color), Transform::identity(), None);
    }

    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        let Some(path) = rounded_rect_path(x, y, w, h, radius) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    pub fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        stroke_width: f32,
        color: Color,
    ) {
        let Some(path) = rounded_rect_path(x, y, w, h, radius) else {
            return;
        };
        let stroke = Stroke {
            width: stroke_width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }

    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, thickness: f32, color: Color) {
        let mut pb = PathBuilder::new();
        pb.move_to(x0, y0);
        pb.line_to(x1, y1);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width: thickness,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Canvas access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Resize the canvas. Contents are discarded.
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<(), FrameError> {
        if width == self.width() && height == self.height() {
            return Ok(());
        }
        self.pixmap = Pixmap::new(width, height).ok_or(FrameError::InvalidSize { width, height })?;
        tracing::debug!(width, height, "Overlay canvas resized");
        Ok(())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, FrameError> {
        self.pixmap
            .encode_png()
            .map_err(|e| FrameError::Encode(e.to_string()))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), FrameError> {
        self.pixmap
            .save_png(path)
            .map_err(|e| FrameError::Encode(e.to_string()))
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<SkPath> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = radius.clamp(0.0, w.min(h) / 2.0);
    if r == 0.0 {
        return Some(PathBuilder::from_rect(Rect::from_xywh(x, y, w, h)?));
    }

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_is_rejected() {
        assert!(matches!(
            OverlayFrame::new(0, 10, 100.0, 100.0),
            Err(FrameError::InvalidSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_scale_factor_is_geometric_mean() {
        let frame = OverlayFrame::new(400, 100, 100.0, 100.0).unwrap();
        assert_eq!(frame.scale_factor(), 2.0);
        assert_eq!(frame.scaled(6.0), 12.0);
    }

    #[test]
    fn test_content_height_limits_background() {
        let mut frame = OverlayFrame::new(100, 100, 100.0, 100.0).unwrap();
        frame.set_background_alpha(255);
        frame.begin_frame_with_content_height(40.0);
        frame.end_frame();
        let inside = frame.pixmap().pixel(50, 20).unwrap();
        let outside = frame.pixmap().pixel(50, 80).unwrap();
        assert_eq!(inside.alpha(), 255);
        assert_eq!(outside.alpha(), 0);
    }

    #[test]
    fn test_move_mode_fills_whole_canvas() {
        let mut frame = OverlayFrame::new(100, 100, 100.0, 100.0).unwrap();
        frame.set_move_mode(true);
        frame.begin_frame_with_content_height(0.0);
        frame.end_frame();
        assert!(frame.pixmap().pixel(50, 80).unwrap().alpha() > 0);
        // Resize grip
        assert!(frame.pixmap().pixel(98, 98).unwrap().alpha() > 0);
    }

    #[test]
    fn test_set_size() {
        let mut frame = OverlayFrame::new(100, 50, 100.0, 50.0).unwrap();
        frame.set_size(200, 100).unwrap();
        assert_eq!((frame.width(), frame.height()), (200, 100));
        assert!(frame.set_size(0, 0).is_err());
        assert_eq!(frame.width(), 200);
    }

    #[test]
    fn test_png_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut frame = OverlayFrame::new(32, 16, 32.0, 16.0).unwrap();
        frame.begin_frame();
        frame.save_png(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert!(!frame.encode_png().unwrap().is_empty());
    }
}
