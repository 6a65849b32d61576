//! Synthetic attention maps used as the prediction explanation.
//!
//! The map is a Gaussian blob centred on a fixed, class-dependent point. It is
//! a visual placeholder and carries no information about the model's actual
//! attribution. Rendering is a pure function of `(width, height, class_id)`.

use crate::core::constants::{SALIENCY_ALPHA_GAIN, SALIENCY_MAX_ALPHA, SALIENCY_SIGMA};
use crate::core::errors::{PlaneError, PlaneResult};
use crate::domain::attention_center_for;
use crate::utils::encoding::encode_png_base64;
use image::{Rgba, RgbaImage};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Encoded explanation payloads returned with a prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationArtifact {
    /// Base64 (standard alphabet, padded) PNG of the RGBA heatmap.
    pub heatmap_base64: String,
    /// Reserved for a composited overlay; currently always `None`.
    pub overlay_base64: Option<String>,
}

/// A quantized intensity grid in `[0, 1]`, indexed `[row, col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SaliencyMap {
    intensity: Array2<f64>,
    center: (f64, f64),
}

/// Normalized coordinate of pixel `i` along an axis of `n` pixels.
fn axis_coord(i: u32, n: u32) -> f64 {
    if n <= 1 {
        0.0
    } else {
        i as f64 / (n - 1) as f64
    }
}

fn clip_u8(v: f64) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

impl SaliencyMap {
    /// Renders a Gaussian blob of width [`SALIENCY_SIGMA`] centred at `center`
    /// (image-fraction coordinates).
    ///
    /// # Errors
    ///
    /// `PlaneError::InvalidInput` if either dimension is zero.
    pub fn render(width: u32, height: u32, center: (f64, f64)) -> PlaneResult<Self> {
        if width == 0 || height == 0 {
            return Err(PlaneError::invalid_input(format!(
                "saliency dimensions must be non-zero, got {width}x{height}"
            )));
        }

        let (cx, cy) = center;
        let two_sigma_sq = 2.0 * SALIENCY_SIGMA * SALIENCY_SIGMA;
        let intensity = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            let dx = axis_coord(col as u32, width) - cx;
            let dy = axis_coord(row as u32, height) - cy;
            let g = (-(dx * dx + dy * dy) / two_sigma_sq).exp();
            // 8-bit quantization
            (g * 255.0).floor() / 255.0
        });

        Ok(Self { intensity, center })
    }

    /// Renders the map for a class, falling back to the image centre for
    /// unknown class ids.
    pub fn for_class(width: u32, height: u32, class_id: usize) -> PlaneResult<Self> {
        Self::render(width, height, attention_center_for(class_id))
    }

    pub fn intensity(&self) -> &Array2<f64> {
        &self.intensity
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn dimensions(&self) -> (u32, u32) {
        let (h, w) = self.intensity.dim();
        (w as u32, h as u32)
    }

    /// Pixel `(x, y)` of the highest intensity; ties go to the first in
    /// row-major order.
    pub fn peak(&self) -> (u32, u32) {
        let mut best = ((0, 0), f64::NEG_INFINITY);
        for ((row, col), &v) in self.intensity.indexed_iter() {
            if v > best.1 {
                best = ((col as u32, row as u32), v);
            }
        }
        best.0
    }

    /// Maps intensities onto a diverging blue/green/red ramp with
    /// intensity-proportional alpha.
    pub fn colorize(&self) -> RgbaImage {
        let (w, h) = self.dimensions();
        RgbaImage::from_fn(w, h, |x, y| {
            let v = self.intensity[[y as usize, x as usize]];
            Rgba([
                clip_u8((v - 0.5) * 2.0 * 255.0),
                clip_u8((1.0 - (v - 0.5).abs() * 2.0) * 255.0),
                clip_u8((0.5 - v) * 2.0 * 255.0),
                clip_u8((v * SALIENCY_ALPHA_GAIN).min(SALIENCY_MAX_ALPHA)),
            ])
        })
    }

    /// Encodes the colorized map as an [`ExplanationArtifact`].
    pub fn to_artifact(&self) -> PlaneResult<ExplanationArtifact> {
        Ok(ExplanationArtifact {
            heatmap_base64: encode_png_base64(&self.colorize())?,
            overlay_base64: None,
        })
    }
}

/// Produces the explanation payload for a prediction on a `width x height`
/// image.
///
/// # Errors
///
/// `PlaneError::InvalidInput` for a zero dimension, or an explanation error if
/// PNG encoding fails.
pub fn explain(width: u32, height: u32, class_id: usize) -> PlaneResult<ExplanationArtifact> {
    SaliencyMap::for_class(width, height, class_id)?.to_artifact()
}
