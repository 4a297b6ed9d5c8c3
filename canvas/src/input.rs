//! Input model: brush settings, color parsing, and the stroke state machine.
//!
//! `BrushState` is what the toolbar collaborator sets and what every stroke
//! reads on pointer-down. `StrokeState` is the gesture being tracked between
//! pointer-down and pointer-up, carrying the last point so each pointer-move
//! can rasterize exactly one new segment.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use image::Rgba;

use crate::consts::{DEFAULT_BRUSH_COLOR, DEFAULT_BRUSH_WIDTH, MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH};
use crate::geom::Point;

/// How a stroke composites onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushMode {
    /// Paint the brush color over existing pixels (source-over).
    #[default]
    Draw,
    /// Remove pixels entirely; covered pixels become fully transparent.
    Erase,
}

/// Brush settings applied to the next stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushState {
    /// Stroke color. Retained while the eraser is active.
    pub color: Rgba<u8>,
    /// Stroke width in pixels, within `MIN_BRUSH_WIDTH..=MAX_BRUSH_WIDTH`.
    pub width: f64,
    /// Draw or erase.
    pub mode: BrushMode,
}

impl Default for BrushState {
    fn default() -> Self {
        Self { color: Rgba(DEFAULT_BRUSH_COLOR), width: DEFAULT_BRUSH_WIDTH, mode: BrushMode::Draw }
    }
}

impl BrushState {
    /// Select a new color. Picking a color always returns to draw mode.
    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.color = color;
        self.mode = BrushMode::Draw;
    }

    /// Set the stroke width, clamped to the toolbar range.
    pub fn set_width(&mut self, width: f64) {
        self.width = if width.is_finite() {
            width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH)
        } else {
            DEFAULT_BRUSH_WIDTH
        };
    }

    /// Flip between draw and erase. The draw color is untouched.
    pub fn toggle_eraser(&mut self) {
        self.mode = match self.mode {
            BrushMode::Draw => BrushMode::Erase,
            BrushMode::Erase => BrushMode::Draw,
        };
    }

    #[must_use]
    pub fn is_eraser(&self) -> bool {
        self.mode == BrushMode::Erase
    }
}

/// Parse a CSS color in `rgb(r, g, b)`, `rgba(r, g, b, a)` or `#rrggbb` form.
///
/// Returns `None` for anything else.
#[must_use]
pub fn parse_color(raw: &str) -> Option<Rgba<u8>> {
    let s = raw.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        return match (channel(0), channel(2), channel(4)) {
            (Ok(r), Ok(g), Ok(b)) => Some(Rgba([r, g, b, 255])),
            _ => None,
        };
    }

    let (body, with_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
        (rest.strip_suffix(')')?, true)
    } else {
        (s.strip_prefix("rgb(")?.strip_suffix(')')?, false)
    };

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let mut rgba = [0u8, 0, 0, 255];
    for (slot, part) in rgba.iter_mut().zip(&parts[..3]) {
        let Ok(v) = part.parse::<u8>() else {
            return None;
        };
        *slot = v;
    }
    if with_alpha {
        let Ok(alpha) = parts[3].parse::<f64>() else {
            return None;
        };
        if !(0.0..=1.0).contains(&alpha) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let a = (alpha * 255.0).round() as u8;
        rgba[3] = a;
    }
    Some(Rgba(rgba))
}

/// Stroke state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    /// No pointer is down.
    #[default]
    Idle,
    /// A stroke is open.
    Active {
        /// Most recent point on the open path.
        last: Point,
        /// Brush captured at pointer-down; toolbar changes mid-stroke do not apply.
        brush: BrushState,
    },
}

impl StrokeState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}
