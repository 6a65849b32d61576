//! Utility functions for image loading.
//!
//! This module turns arbitrary encoded image bytes into the canonical 8-bit
//! RGB pixel grid the rest of the pipeline works on.

use crate::core::errors::{PlaneError, PlaneResult};
use image::{DynamicImage, ImageReader, RgbImage};
use std::io::Cursor;

/// Converts a DynamicImage to an RgbImage.
///
/// Grayscale, alpha and palette sources all come out as 3-channel RGB8; any
/// alpha channel is dropped.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Decodes encoded image bytes into an RgbImage.
///
/// The container format is detected from the content itself.
///
/// # Errors
///
/// Returns `PlaneError::ImageDecode` when the bytes are empty, the format is
/// not recognized, or the decoder rejects the data. A partially decoded image
/// is never returned.
pub fn load_image_from_bytes(bytes: &[u8]) -> PlaneResult<RgbImage> {
    if bytes.is_empty() {
        return Err(PlaneError::decode_error("empty image payload", None));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PlaneError::decode_error(format!("failed to sniff format: {e}"), None))?;

    if reader.format().is_none() {
        return Err(PlaneError::decode_error("unrecognized image format", None));
    }

    let img = reader
        .decode()
        .map_err(|e| PlaneError::decode_error("failed to decode image data", Some(e)))?;
    Ok(dynamic_to_rgb(img))
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// `PlaneError::Io` if the file cannot be read, otherwise the same errors as
/// [`load_image_from_bytes`].
pub fn load_image(path: &std::path::Path) -> PlaneResult<RgbImage> {
    let bytes = std::fs::read(path)?;
    load_image_from_bytes(&bytes)
}
