//! The core module of the inference pipeline.
//!
//! This module contains the fundamental pieces shared by every stage:
//! - Configuration management
//! - Constants (class order, input geometry, numeric guards)
//! - Error handling
//! - ONNX Runtime integration
//! - The scoring backend trait
//!
//! It also provides re-exports of commonly used types and the tracing setup.

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod tensor;
pub mod traits;

pub use config::{ConfigError, ConfigValidator, LogFormat, ServiceConfig};
pub use constants::*;
pub use errors::{ErrorKind, PlaneError, PlaneResult, ProcessingStage};
pub use inference::{OrtInfer, load_session};
pub use tensor::{Tensor2D, Tensor4D};
pub use traits::ScoringBackend;

/// Initializes the tracing subscriber for logging.
///
/// The filter comes from `RUST_LOG` and falls back to `info`. `LogFormat::Json`
/// emits one JSON object per line. Logs go to stderr. Calling this more than
/// once is harmless; the first subscriber stays installed.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (text_layer, json_layer) = match format {
        LogFormat::Text => (Some(fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .try_init();
}
