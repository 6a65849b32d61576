//! Encoding of rendered rasters into transport-safe payloads.

use crate::core::errors::{PlaneError, PlaneResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// Encodes an RGBA raster as PNG bytes.
///
/// The encoder settings are fixed, so identical rasters produce identical bytes.
pub fn encode_rgba_png(img: &RgbaImage) -> PlaneResult<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| PlaneError::explanation_error("failed to encode raster as PNG", e))?;
    Ok(buf)
}

/// Standard, padded base64.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// PNG-encodes a raster and wraps it in base64.
pub fn encode_png_base64(img: &RgbaImage) -> PlaneResult<String> {
    encode_rgba_png(img).map(|png| to_base64(&png))
}
