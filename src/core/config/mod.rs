//! Configuration management for the inference service.
//!
//! This module provides configuration types, validation traits, and the
//! layered loader used by the binaries.

pub mod errors;
pub mod onnx;
pub mod service;

pub use errors::{ConfigError, ConfigValidator};
pub use onnx::{ModelInferenceConfig, OrtGraphOptimizationLevel, OrtSessionConfig};
pub use service::{LogFormat, ServiceConfig, TemperatureCalibration};
