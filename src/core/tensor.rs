//! Tensor aliases shared by the preprocessor and the inference engine.

/// A 2D tensor of `f32` values, used for `batch x classes` score matrices.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4D tensor of `f32` values in NCHW layout.
pub type Tensor4D = ndarray::Array4<f32>;
