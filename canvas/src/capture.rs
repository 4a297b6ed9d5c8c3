//! Capture: lossless PNG snapshots of the pixel buffer.
//!
//! The evaluation service receives the drawing as a `data:image/png;base64,`
//! URI, the same encoding a browser canvas produces for `toDataURL`.

#[cfg(test)]
#[path = "capture_test.rs"]
mod capture_test;

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};

/// MIME prefix of a PNG data URI.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Errors produced while encoding or decoding a capture.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The PNG codec rejected the data.
    #[error("png codec failed: {0}")]
    Codec(#[from] image::ImageError),
}

impl CaptureError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Codec(_) => "E_CAPTURE_CODEC",
        }
    }
}

/// An encoded still image of the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Raw PNG bytes.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Capture {
    /// The PNG as a base64 data URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        let mut uri = String::with_capacity(PNG_DATA_URI_PREFIX.len() + self.png.len() * 4 / 3 + 4);
        uri.push_str(PNG_DATA_URI_PREFIX);
        STANDARD.encode_string(&self.png, &mut uri);
        uri
    }
}

/// Encode `buffer` as PNG. Takes a shared borrow, so the buffer cannot change
/// size or content while the snapshot is taken.
///
/// # Errors
///
/// Returns [`CaptureError::Codec`] if the PNG encoder fails.
pub fn export(buffer: &RgbaImage) -> Result<Capture, CaptureError> {
    let mut png = Vec::new();
    buffer.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(Capture { png, width: buffer.width(), height: buffer.height() })
}

/// Decode PNG bytes into an RGBA buffer, for loading an existing drawing.
///
/// # Errors
///
/// Returns [`CaptureError::Codec`] if `bytes` is not a readable PNG.
pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, CaptureError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    Ok(img.to_rgba8())
}
