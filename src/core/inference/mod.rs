//! ONNX Runtime integration.
//!
//! This module holds the session helpers and the pooled scoring engine that
//! implements [`ScoringBackend`](crate::core::traits::ScoringBackend).

pub mod ort_infer;
pub mod session;

pub use ort_infer::OrtInfer;
pub use session::load_session;
