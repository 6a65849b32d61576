//! Error types for the inference pipeline.
//!
//! This module defines the errors that can occur while turning an uploaded
//! image into a prediction: decoding failures, an unavailable model, forward
//! pass failures, numeric post-processing failures and configuration problems.
//! Every error can be classified with [`PlaneError::kind`] so callers can pick
//! between client-input and server-side status semantics.

use crate::core::config::ConfigError;
use thiserror::Error;

/// Enum representing the stages of the inference pipeline.
///
/// Used to label errors and log lines with the stage they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Decoding raw bytes into an RGB image.
    Decode,
    /// Resizing and scaling into the model tensor.
    Preprocess,
    /// Running the model forward pass.
    Scoring,
    /// Softmax, argmax and other numeric post-processing.
    PostProcessing,
    /// Entropy and confidence estimation.
    Uncertainty,
    /// Saliency rendering and encoding.
    Explanation,
    /// Composing the final response.
    Assembly,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Decode => write!(f, "decode"),
            ProcessingStage::Preprocess => write!(f, "preprocess"),
            ProcessingStage::Scoring => write!(f, "scoring"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
            ProcessingStage::Uncertainty => write!(f, "uncertainty"),
            ProcessingStage::Explanation => write!(f, "explanation"),
            ProcessingStage::Assembly => write!(f, "assembly"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Coarse classification of a [`PlaneError`] for status selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied input that cannot be processed.
    ClientInput,
    /// The scoring backend never initialized; fatal until restart.
    ModelUnavailable,
    /// Anything else; surfaced as an opaque server error.
    Internal,
}

/// A plain message error used as the source of errors that have no
/// underlying library error.
#[derive(Debug, Clone)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SimpleError {}

/// Enum representing the errors that can occur in the inference pipeline.
#[derive(Error, Debug)]
pub enum PlaneError {
    /// The input bytes are not a decodable image.
    #[error("image decode failed: {context}")]
    ImageDecode {
        /// What went wrong while decoding.
        context: String,
        /// The decoder error, when there is one.
        #[source]
        source: Option<image::ImageError>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// The model handle never loaded; every scoring call fails with this.
    #[error("model is not loaded (artifact '{model_path}'): {reason}")]
    ModelNotLoaded {
        /// Path the handle was created from.
        model_path: String,
        /// Why the artifact could not be loaded.
        reason: String,
    },

    /// Error raised while creating the scoring session.
    #[error("failed to load model '{model_path}': {reason}{suggestion}")]
    ModelLoad {
        /// Path of the model artifact.
        model_path: String,
        /// Short description of the failure.
        reason: String,
        /// Optional hint, already formatted with a leading separator.
        suggestion: String,
        /// The runtime error, when there is one.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error during the model forward pass.
    #[error("scoring failed for model '{model_name}': {context}")]
    Scoring {
        /// Name of the model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error during numeric post-processing, explanation or assembly.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json")]
    Json(#[from] serde_json::Error),
}

/// Convenient result alias for pipeline operations.
pub type PlaneResult<T> = Result<T, PlaneError>;

impl PlaneError {
    /// Creates a decode error, optionally wrapping the decoder error.
    pub fn decode_error(context: impl Into<String>, source: Option<image::ImageError>) -> Self {
        Self::ImageDecode {
            context: context.into(),
            source,
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an error for a scoring call against an unloaded model.
    pub fn model_not_loaded(
        model_path: impl AsRef<std::path::Path>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ModelNotLoaded {
            model_path: model_path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a model load error with an optional suggestion and source.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path of the artifact that failed to load.
    /// * `reason` - Short description of the failure.
    /// * `suggestion` - Optional hint appended to the message.
    /// * `source` - Optional underlying error.
    pub fn model_load_error(
        model_path: impl AsRef<std::path::Path>,
        reason: impl Into<String>,
        suggestion: Option<&str>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let suggestion = suggestion
            .map(|s| format!("; suggested fix: {}", s))
            .unwrap_or_default();
        Self::ModelLoad {
            model_path: model_path.as_ref().display().to_string(),
            reason: reason.into(),
            suggestion,
            source: source.map(|e| Box::new(e) as _),
        }
    }

    /// Creates a forward-pass error for the named model.
    pub fn scoring_error(
        model_name: &str,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Scoring {
            model_name: model_name.to_string(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an error for a failed processing stage.
    pub fn processing(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a numeric post-processing error.
    pub fn post_processing(context: &str, message: &str) -> Self {
        Self::processing(
            ProcessingStage::PostProcessing,
            context,
            SimpleError::new(message),
        )
    }

    /// Creates an explanation rendering or encoding error.
    pub fn explanation_error(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing(ProcessingStage::Explanation, context, error)
    }

    /// Creates an error for an inconsistent set of component outputs.
    pub fn assembly_error(context: &str, message: &str) -> Self {
        Self::processing(ProcessingStage::Assembly, context, SimpleError::new(message))
    }

    /// Classifies the error for status selection.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ImageDecode { .. } | Self::InvalidInput { .. } => ErrorKind::ClientInput,
            Self::ModelNotLoaded { .. } | Self::ModelLoad { .. } => ErrorKind::ModelUnavailable,
            _ => ErrorKind::Internal,
        }
    }

    /// The pipeline stage the error belongs to.
    pub fn stage(&self) -> ProcessingStage {
        match self {
            Self::ImageDecode { .. } | Self::InvalidInput { .. } => ProcessingStage::Decode,
            Self::ModelNotLoaded { .. }
            | Self::ModelLoad { .. }
            | Self::Scoring { .. }
            | Self::Tensor(_) => ProcessingStage::Scoring,
            Self::Processing { kind, .. } => *kind,
            Self::Config(_) | Self::Io(_) | Self::Json(_) => ProcessingStage::Generic,
        }
    }

    /// A human-readable message that is safe to hand back to a client.
    ///
    /// Client input errors carry their own description; model and internal
    /// errors are reduced to a fixed sentence so runtime details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::ClientInput => self.to_string(),
            ErrorKind::ModelUnavailable => "Model is not loaded.".to_string(),
            ErrorKind::Internal => format!("Prediction failed during {}", self.stage()),
        }
    }
}
