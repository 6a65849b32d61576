//! ONNX Runtime configuration types.

use serde::{Deserialize, Serialize};

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    #[default]
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
}

/// Configuration for ONNX Runtime sessions.
///
/// Every field is optional; unset fields keep the runtime defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes
    pub inter_threads: Option<usize>,
    /// Graph optimization level
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }
}

/// Settings used to build the scoring backend for one model artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInferenceConfig {
    /// Display name of the model; defaults to the artifact's file stem.
    pub model_name: Option<String>,
    /// Name of the input tensor; discovered from the session when unset.
    pub input_name: Option<String>,
    /// Number of sessions kept for concurrent scoring.
    pub session_pool_size: usize,
    /// Optional ONNX Runtime session settings.
    pub ort_session: Option<OrtSessionConfig>,
}

impl Default for ModelInferenceConfig {
    fn default() -> Self {
        Self {
            model_name: None,
            input_name: None,
            session_pool_size: 1,
            ort_session: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ort_session_config_builder() {
        let config = OrtSessionConfig::new()
            .with_intra_threads(4)
            .with_inter_threads(2)
            .with_optimization_level(OrtGraphOptimizationLevel::Level3);

        assert_eq!(config.intra_threads, Some(4));
        assert_eq!(config.inter_threads, Some(2));
        assert_eq!(
            config.optimization_level,
            Some(OrtGraphOptimizationLevel::Level3)
        );
    }

    #[test]
    fn test_ort_session_config_deserializes_partial_json() {
        let config: OrtSessionConfig =
            serde_json::from_str(r#"{"intra_threads": 2}"#).unwrap();
        assert_eq!(config.intra_threads, Some(2));
        assert_eq!(config.inter_threads, None);
        assert_eq!(config.optimization_level, None);
    }

    #[test]
    fn test_model_inference_config_defaults_to_single_session() {
        let config = ModelInferenceConfig::default();
        assert_eq!(config.session_pool_size, 1);
        assert!(config.ort_session.is_none());
    }
}
