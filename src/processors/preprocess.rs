//! Resizing and scaling of decoded images into the model input tensor.

use crate::core::constants::{MODEL_INPUT_CHANNELS, MODEL_INPUT_SHAPE, PIXEL_SCALE};
use crate::core::errors::{PlaneError, PlaneResult};
use crate::core::tensor::Tensor4D;
use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::Array4;

/// The tensor handed to the scoring backend.
///
/// Always shaped `[1, 3, H, W]` (NCHW), channels in R, G, B order, values in
/// `[0, 1]`. Instances only come out of [`Preprocessor::normalize`], so the
/// shape and range hold for every value of this type.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInputTensor(Tensor4D);

impl ModelInputTensor {
    /// Borrows the underlying array.
    pub fn as_array(&self) -> &Tensor4D {
        &self.0
    }

    /// `[batch, channels, height, width]`.
    pub fn shape(&self) -> [usize; 4] {
        let s = self.0.shape();
        [s[0], s[1], s[2], s[3]]
    }

    pub fn into_inner(self) -> Tensor4D {
        self.0
    }
}

/// Settings for [`Preprocessor`].
#[derive(Debug, Clone, Copy)]
pub struct PreprocessConfig {
    /// Target `(width, height)`.
    pub input_shape: (u32, u32),
    /// Interpolation used for the resize.
    pub resize_filter: FilterType,
    /// Multiplier applied to every 8-bit sample.
    pub scale: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            input_shape: MODEL_INPUT_SHAPE,
            resize_filter: FilterType::Triangle,
            scale: PIXEL_SCALE,
        }
    }
}

/// Converts RGB images into [`ModelInputTensor`]s.
///
/// The aspect ratio is not preserved; every image is stretched to the target
/// size. No mean/std normalization is applied, only the linear scale.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    /// Creates a preprocessor, validating the settings.
    ///
    /// # Errors
    ///
    /// `PlaneError::InvalidInput` if either target dimension is zero or the
    /// scale is not a positive finite number.
    pub fn new(config: PreprocessConfig) -> PlaneResult<Self> {
        let (w, h) = config.input_shape;
        if w == 0 || h == 0 {
            return Err(PlaneError::invalid_input(format!(
                "input shape must be non-zero, got {w}x{h}"
            )));
        }
        if !config.scale.is_finite() || config.scale <= 0.0 {
            return Err(PlaneError::invalid_input(format!(
                "scale must be a positive finite number, got {}",
                config.scale
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Resizes the image to the target size and lays it out as NCHW `f32`.
    ///
    /// Deterministic: the same image always yields the same tensor.
    pub fn normalize(&self, img: &RgbImage) -> ModelInputTensor {
        let (target_w, target_h) = self.config.input_shape;
        let resized;
        let src = if img.dimensions() == (target_w, target_h) {
            img
        } else {
            resized = imageops::resize(img, target_w, target_h, self.config.resize_filter);
            &resized
        };

        let (w, h) = (target_w as usize, target_h as usize);
        let scale = self.config.scale;
        let mut tensor = Array4::<f32>::zeros((1, MODEL_INPUT_CHANNELS, h, w));
        for (x, y, pixel) in src.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..MODEL_INPUT_CHANNELS {
                tensor[[0, c, y, x]] = (pixel[c] as f32 * scale).clamp(0.0, 1.0);
            }
        }
        ModelInputTensor(tensor)
    }
}

/// Normalizes with the default 224x224 configuration.
pub fn normalize(img: &RgbImage) -> ModelInputTensor {
    Preprocessor::default().normalize(img)
}
