//! Trait definitions for the inference pipeline.
//!
//! The only pluggable seam is the scoring backend: the ONNX Runtime engine in
//! production, or any deterministic scorer in tests and tooling.

pub mod scoring;

pub use scoring::ScoringBackend;
