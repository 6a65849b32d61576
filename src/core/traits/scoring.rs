//! The seam between the pipeline and whatever produces class scores.

use crate::core::errors::PlaneResult;
use crate::processors::ModelInputTensor;
use std::fmt::Debug;

/// Trait for a model that turns a normalized tensor into raw class scores.
///
/// Implementations must be pure with respect to their input: the same tensor
/// always yields the same logits, and scoring never mutates shared state that
/// another request could observe. Any internal serialization a runtime needs
/// (e.g. exclusive access to a session) stays inside the implementation.
pub trait ScoringBackend: Send + Sync + Debug {
    /// Runs the forward pass and returns one logit per class, in class order.
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor produced by the preprocessor.
    ///
    /// # Returns
    ///
    /// The raw, unbounded score vector or an error from the runtime.
    fn forward(&self, input: &ModelInputTensor) -> PlaneResult<Vec<f32>>;

    /// Name used in logs and error messages.
    fn model_name(&self) -> &str;

    /// Number of scores the backend emits per input, when it is known up front.
    fn output_len(&self) -> Option<usize> {
        None
    }
}
