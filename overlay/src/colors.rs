//! Fixed colors used by the overlay chrome

use tiny_skia::Color;

pub fn transparent() -> Color {
    Color::TRANSPARENT
}

pub fn white() -> Color {
    Color::WHITE
}

/// Panel fill behind the timeline
pub fn background(alpha: u8) -> Color {
    Color::from_rgba8(30, 30, 30, alpha)
}

/// Border drawn around the window in move mode
pub fn frame_border() -> Color {
    Color::from_rgba8(120, 170, 255, 220)
}

pub fn resize_indicator() -> Color {
    Color::from_rgba8(200, 200, 200, 160)
}

/// Backing square drawn where the host will composite an icon
pub fn icon_slot() -> Color {
    Color::from_rgba8(12, 12, 14, 200)
}

pub fn icon_border() -> Color {
    Color::from_rgba8(0, 0, 0, 220)
}
