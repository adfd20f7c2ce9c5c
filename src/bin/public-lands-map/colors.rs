//! Color constants for labels, popups and the scroll hint.

use eframe::egui::Color32;
use public_lands_map::Color;

// Map background shown under missing tiles
pub const MAP_BACKGROUND: Color32 = Color32::from_rgb(28, 32, 36);

// Text colors
pub const LABEL_TEXT: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 230);
pub const LABEL_SHADOW: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 180);
pub const LABEL_BACKGROUND: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 110);

// Scroll hint
pub const HINT_BACKGROUND: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 170);
pub const HINT_TEXT: Color32 = Color32::WHITE;

/// Converts a configured color and opacity (0.0..=1.0) to an egui color.
pub fn with_opacity(color: Color, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}

pub fn opaque(color: Color) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}
