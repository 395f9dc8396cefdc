//! Bitmap encoders for captures.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{Rgb, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::VizdocError;
use crate::scene::Color;

/// Lowest JPEG quality accepted.
pub const MIN_JPEG_QUALITY: f32 = 0.6;
/// Highest JPEG quality accepted.
pub const MAX_JPEG_QUALITY: f32 = 0.92;

/// Capture encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum Encoding {
    Png,
    /// `quality` in `0.0..=1.0`, clamped to the accepted range.
    Jpeg { quality: f32 },
}

impl Encoding {
    pub fn mime(&self) -> &'static str {
        match self {
            Encoding::Png => "image/png",
            Encoding::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Encoding::Png => "png",
            Encoding::Jpeg { .. } => "jpg",
        }
    }
}

/// Encoder quality (1-100) for a fractional JPEG quality.
pub fn jpeg_quality(quality: f32) -> u8 {
    let q = if quality.is_finite() { quality } else { MAX_JPEG_QUALITY };
    (q.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY) * 100.0).round() as u8
}

/// Composite `image` over an opaque `background`, dropping alpha.
pub fn flatten(image: &RgbaImage, background: Color) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (dst, src) in out.pixels_mut().zip(image.pixels()) {
        let a = src[3] as u32;
        let mix = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
        *dst = Rgb([
            mix(src[0], background.r),
            mix(src[1], background.g),
            mix(src[2], background.b),
        ]);
    }
    out
}

/// Encode a rasterized page. JPEG output is flattened onto `background`.
pub fn encode(image: &RgbaImage, encoding: Encoding, background: Color) -> Result<Vec<u8>, VizdocError> {
    let mut bytes = Vec::new();
    match encoding {
        Encoding::Png => image
            .write_with_encoder(PngEncoder::new(&mut bytes))
            .map_err(|e| VizdocError::Image(format!("PNG encoding failed: {}", e)))?,
        Encoding::Jpeg { quality } => {
            let opaque = background.with_alpha(255);
            flatten(image, opaque)
                .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality)))
                .map_err(|e| VizdocError::Image(format!("JPEG encoding failed: {}", e)))?
        }
    }
    Ok(bytes)
}
