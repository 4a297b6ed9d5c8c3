//! Where results go: the bounding box of drawn content and its centre.
//!
//! A pixel counts as drawn when its alpha is nonzero, so erased pixels and
//! a cleared surface contribute nothing.

#[cfg(test)]
#[path = "locate_test.rs"]
mod locate_test;

use image::RgbaImage;

use crate::geom::{Point, Rect};

/// Bounding rectangle of every pixel with nonzero alpha, or `None` if the
/// buffer is fully transparent. Single pass over all pixels.
#[must_use]
pub fn content_bounds(buffer: &RgbaImage) -> Option<Rect> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, px) in buffer.enumerate_pixels() {
        if px[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)),
        });
    }
    bounds.map(|(min_x, min_y, max_x, max_y)| {
        Rect::new(f64::from(min_x), f64::from(min_y), f64::from(max_x), f64::from(max_y))
    })
}

/// Bounding rectangle of drawn content; [`Rect::EMPTY`] for a blank buffer.
#[must_use]
pub fn locate(buffer: &RgbaImage) -> Rect {
    content_bounds(buffer).unwrap_or(Rect::EMPTY)
}

/// Placement point for new overlays: the center of [`locate`].
#[must_use]
pub fn anchor(buffer: &RgbaImage) -> Point {
    locate(buffer).center()
}
