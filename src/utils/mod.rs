//! Utility functions for the pipeline.
//!
//! Image decoding from bytes or files, and the PNG/base64 encoding used to
//! ship rendered overlays.

pub mod encoding;
pub mod image;

pub use encoding::{encode_png_base64, encode_rgba_png, to_base64};
pub use image::{dynamic_to_rgb, load_image, load_image_from_bytes};
