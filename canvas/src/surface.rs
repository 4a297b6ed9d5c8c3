//! Drawing surface: the pixel buffer and the stroke state machine.
//!
//! The surface is either `Idle` or has one open stroke. `begin_stroke` opens
//! a path and captures the brush, `continue_stroke` rasterizes one segment
//! from the previous point, and `end_stroke` closes the path. Out-of-state
//! calls are no-ops. Resizing is refused while a stroke is open; callers that
//! own the lifecycle (see [`crate::engine::EngineCore::resize`]) close the
//! stroke first.
//!
//! Segments are rasterized as capsules (round caps and joins) with binary
//! coverage: a pixel is covered when its center lies within half the brush
//! width of the segment.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::geom::{Point, dist_sq_to_segment};
use crate::input::{BrushMode, BrushState, StrokeState};

/// A fully transparent pixel.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Errors produced by surface geometry changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// A resize was attempted while a stroke is open.
    #[error("cannot resize while a stroke is active")]
    StrokeActive,
    /// Width or height of zero was requested.
    #[error("surface dimensions must be non-zero (got {width}x{height})")]
    ZeroSize { width: u32, height: u32 },
}

impl SurfaceError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::StrokeActive => "E_STROKE_ACTIVE",
            Self::ZeroSize { .. } => "E_ZERO_SIZE",
        }
    }
}

/// Raster canvas plus the open stroke, if any.
pub struct DrawingSurface {
    buffer: RgbaImage,
    stroke: StrokeState,
}

impl DrawingSurface {
    /// Create a fully transparent surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { buffer: RgbaImage::from_pixel(width, height, TRANSPARENT), stroke: StrokeState::Idle }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Read-only view of the pixel buffer.
    #[must_use]
    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    #[must_use]
    pub fn stroke_state(&self) -> StrokeState {
        self.stroke
    }

    #[must_use]
    pub fn is_stroking(&self) -> bool {
        self.stroke.is_active()
    }

    /// Open a new stroke at `point` using `brush`.
    ///
    /// A pointer-down that arrives while a stroke is already open closes that
    /// stroke first, so the surface is never active twice without an end.
    /// Non-finite points are ignored and leave the state unchanged.
    pub fn begin_stroke(&mut self, point: Point, brush: &BrushState) -> bool {
        if !is_finite(point) {
            return false;
        }
        if self.stroke.is_active() {
            debug!("pointer-down during open stroke; closing previous stroke");
            self.end_stroke();
        }
        self.stroke = StrokeState::Active { last: point, brush: *brush };
        true
    }

    /// Extend the open stroke to `point`. Returns `true` if any pixel was touched.
    pub fn continue_stroke(&mut self, point: Point) -> bool {
        let StrokeState::Active { last, brush } = self.stroke else {
            return false;
        };
        if !is_finite(point) {
            return false;
        }
        let touched = self.rasterize_segment(last, point, &brush);
        self.stroke = StrokeState::Active { last: point, brush };
        touched
    }

    /// Close the open stroke. Idempotent; returns whether a stroke was open.
    pub fn end_stroke(&mut self) -> bool {
        let was_active = self.stroke.is_active();
        self.stroke = StrokeState::Idle;
        was_active
    }

    /// Make every pixel transparent. The stroke state is untouched.
    pub fn clear(&mut self) {
        for px in self.buffer.pixels_mut() {
            *px = TRANSPARENT;
        }
    }

    /// Whether every pixel is fully transparent.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.buffer.pixels().all(|px| px[3] == 0)
    }

    /// Change the surface dimensions, keeping the overlapping top-left region.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StrokeActive`] while a stroke is open and
    /// [`SurfaceError::ZeroSize`] for an empty size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if self.stroke.is_active() {
            return Err(SurfaceError::StrokeActive);
        }
        if width == 0 || height == 0 {
            return Err(SurfaceError::ZeroSize { width, height });
        }
        if width == self.width() && height == self.height() {
            return Ok(());
        }

        let mut next = RgbaImage::from_pixel(width, height, TRANSPARENT);
        let keep_w = width.min(self.width());
        let keep_h = height.min(self.height());
        for y in 0..keep_h {
            for x in 0..keep_w {
                next.put_pixel(x, y, *self.buffer.get_pixel(x, y));
            }
        }
        self.buffer = next;
        Ok(())
    }

    /// Replace the whole buffer, taking on its dimensions.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DrawingSurface::resize`].
    pub fn load(&mut self, buffer: RgbaImage) -> Result<(), SurfaceError> {
        if self.stroke.is_active() {
            return Err(SurfaceError::StrokeActive);
        }
        if buffer.width() == 0 || buffer.height() == 0 {
            return Err(SurfaceError::ZeroSize { width: buffer.width(), height: buffer.height() });
        }
        self.buffer = buffer;
        Ok(())
    }

    /// Direct pixel write, for hosts that load existing raster content.
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Rgba<u8>) {
        if x < self.width() && y < self.height() {
            self.buffer.put_pixel(x, y, pixel);
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn rasterize_segment(&mut self, a: Point, b: Point, brush: &BrushState) -> bool {
        // The pixel containing the path is always covered, even for hairlines.
        let reach = (brush.width / 2.0).max(std::f64::consts::FRAC_1_SQRT_2);
        let reach_sq = reach * reach;

        let w = f64::from(self.width());
        let h = f64::from(self.height());
        let x0 = (a.x.min(b.x) - reach).floor().clamp(0.0, w) as u32;
        let x1 = (a.x.max(b.x) + reach).ceil().clamp(0.0, w) as u32;
        let y0 = (a.y.min(b.y) - reach).floor().clamp(0.0, h) as u32;
        let y1 = (a.y.max(b.y) + reach).ceil().clamp(0.0, h) as u32;

        let mut touched = false;
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if dist_sq_to_segment(center, a, b) > reach_sq {
                    continue;
                }
                let px = self.buffer.get_pixel_mut(x, y);
                *px = match brush.mode {
                    BrushMode::Draw => composite_over(*px, brush.color),
                    BrushMode::Erase => TRANSPARENT,
                };
                touched = true;
            }
        }
        touched
    }
}

/// Source-over compositing of `src` onto `dst` (straight alpha).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn composite_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = f64::from(src[3]) / 255.0;
    if sa >= 1.0 {
        return src;
    }
    if sa <= 0.0 {
        return dst;
    }
    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for (i, slot) in out.iter_mut().take(3).enumerate() {
        let c = (f64::from(src[i]) * sa + f64::from(dst[i]) * da * (1.0 - sa)) / out_a;
        *slot = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
