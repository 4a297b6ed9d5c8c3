//! Shared numeric constants for the canvas crate.

// ── Brush ───────────────────────────────────────────────────────

/// Default stroke width in pixels.
pub const DEFAULT_BRUSH_WIDTH: f64 = 3.0;

/// Smallest stroke width the toolbar can select.
pub const MIN_BRUSH_WIDTH: f64 = 1.0;

/// Largest stroke width the toolbar can select.
pub const MAX_BRUSH_WIDTH: f64 = 20.0;

/// Default stroke color (`rgb(255, 255, 255)`).
pub const DEFAULT_BRUSH_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Toolbar swatch palette, as CSS color strings.
pub const SWATCHES: [&str; 10] = [
    "rgb(255, 255, 255)",
    "rgb(0, 0, 0)",
    "#ee3333",
    "#e64980",
    "#be4bdb",
    "#893200",
    "#228be6",
    "#3333ee",
    "#40c057",
    "#00aa00",
];

// ── Surface ─────────────────────────────────────────────────────

/// Default surface width in pixels.
pub const DEFAULT_SURFACE_WIDTH: u32 = 1280;

/// Default surface height in pixels.
pub const DEFAULT_SURFACE_HEIGHT: u32 = 720;

// ── Overlays ────────────────────────────────────────────────────

/// Delay between submission and overlay visibility, in milliseconds.
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 1000;
