//! ONNX Runtime scoring engine with a small session pool.

use crate::core::errors::PlaneError;
use ort::{session::Session, value::ValueType};
use std::sync::Mutex;

#[path = "ort_infer_builders.rs"]
mod ort_infer_builders;
#[path = "ort_infer_execution.rs"]
mod ort_infer_execution;
#[cfg(test)]
#[path = "ort_infer_tests.rs"]
mod ort_infer_tests;

/// Scores tensors with an ONNX classifier.
///
/// A running ONNX Runtime session needs exclusive access, so each session sits
/// behind its own mutex and calls are spread round-robin over the pool. The
/// engine itself carries no per-request state.
pub struct OrtInfer {
    pub(super) sessions: Vec<Mutex<Session>>,
    pub(super) next_idx: std::sync::atomic::AtomicUsize,
    pub(super) input_name: String,
    pub(super) output_name: String,
    pub(super) output_len: Option<usize>,
    pub(super) model_path: std::path::PathBuf,
    pub(super) model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("output_len", &self.output_len)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Returns the model path associated with this engine.
    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    /// Returns the model name associated with this engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Name of the input tensor the engine feeds.
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Number of pooled sessions.
    pub fn pool_size(&self) -> usize {
        self.sessions.len()
    }

    /// Retrieves the primary input tensor shape from the first session.
    ///
    /// Dynamic dimensions (e.g., -1) are returned as-is.
    pub fn primary_input_shape(&self) -> Option<Vec<i64>> {
        let session_guard = self.sessions.first()?.lock().ok()?;
        let input = session_guard.inputs.first()?;
        tensor_shape(&input.input_type)
    }
}

/// Extracts the dimensions of a tensor value type.
pub(super) fn tensor_shape(value_type: &ValueType) -> Option<Vec<i64>> {
    match value_type {
        ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
        _ => None,
    }
}

/// Number of scores per sample declared by an output shape, when it is static.
pub(super) fn static_class_count(shape: &[i64]) -> Option<usize> {
    match shape.last() {
        Some(&dim) if dim > 0 && shape.len() >= 2 => Some(dim as usize),
        _ => None,
    }
}
