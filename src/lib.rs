//! # Fetal Plane
//!
//! Classification of fetal ultrasound images into standard anatomical planes,
//! with an uncertainty estimate and a visual saliency overlay for every
//! prediction. Scoring runs on ONNX models through ONNX Runtime.
//!
//! ## Pipeline
//!
//! 1. **Decode**: encoded bytes into an 8-bit RGB image
//! 2. **Preprocess**: resize to 224x224 and scale into an NCHW `f32` tensor
//! 3. **Score**: forward pass, stabilized softmax, argmax
//! 4. **Uncertainty**: predictive entropy and top-1 confidence
//! 5. **Explain**: a class-centred Gaussian heatmap, PNG and base64 encoded
//! 6. **Assemble**: a checked, serializable [`pipeline::PredictionResponse`]
//!
//! The heatmap is a synthetic placeholder. It does not reflect what the model
//! attends to and must not be read as an attribution method.
//!
//! ## Modules
//!
//! * [`core`] - Configuration, errors, ONNX Runtime integration and tracing setup
//! * [`domain`] - The plane taxonomy
//! * [`models`] - The classifier handle
//! * [`pipeline`] - End-to-end prediction and response types
//! * [`processors`] - Preprocessing, softmax, uncertainty and saliency
//! * [`utils`] - Image decoding and payload encoding
//! * `server` - HTTP surface (feature `server`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fetal_plane::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::default();
//! let handle = ModelHandle::load(&config.model_path, &config.inference_config());
//! let pipeline = PlanePipeline::new(Arc::new(handle));
//!
//! let bytes = std::fs::read("scan.png")?;
//! let response = pipeline.predict(&bytes)?;
//! println!("{} ({:.3})", response.prediction.label, response.prediction.confidence);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod models;
pub mod pipeline;
pub mod processors;
#[cfg(feature = "server")]
pub mod server;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use fetal_plane::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::config::ServiceConfig;
    pub use crate::core::{ErrorKind, PlaneError, PlaneResult};
    pub use crate::domain::FetalPlane;
    pub use crate::models::{ModelHandle, ScoreOutput};
    pub use crate::pipeline::{PlanePipeline, PredictionResponse};
    pub use crate::utils::load_image;
}
