//! Image and score processors.
//!
//! This module provides the numeric stages around the model forward pass:
//! - Preprocessing an RGB image into the model input tensor
//! - Softmax, temperature scaling and argmax over raw scores
//! - Entropy-based uncertainty estimation
//! - Synthetic attention-map rendering for explanations

pub mod preprocess;
pub mod probability;
pub mod saliency;
pub mod uncertainty;

pub use preprocess::{ModelInputTensor, PreprocessConfig, Preprocessor, normalize};
pub use probability::{ProbabilityDistribution, apply_temperature_scaling, softmax};
pub use saliency::{ExplanationArtifact, SaliencyMap, explain};
pub use uncertainty::{UncertaintyMetrics, estimate, max_entropy, predictive_entropy};
