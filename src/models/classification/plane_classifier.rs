//! Fetal plane classifier handle.
//!
//! [`ModelHandle`] owns the scoring backend for the lifetime of the process.
//! Loading never fails outright: a missing or broken artifact produces a handle
//! in the unavailable state, and every scoring call on it reports
//! `PlaneError::ModelNotLoaded`. This lets a service start, answer health
//! checks and report the problem instead of exiting.

use crate::core::config::ModelInferenceConfig;
use crate::core::constants::NUM_CLASSES;
use crate::core::errors::{PlaneError, PlaneResult};
use crate::core::inference::OrtInfer;
use crate::core::traits::ScoringBackend;
use crate::domain::FetalPlane;
use crate::processors::{ModelInputTensor, ProbabilityDistribution, softmax};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// One entry of a ranked class list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassScore {
    pub class_id: usize,
    pub label: &'static str,
    pub probability: f64,
}

/// Scores for a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutput {
    /// `argmax` of the probabilities; ties go to the lowest index.
    pub class_id: usize,
    pub label: &'static str,
    /// `probabilities[class_id]`.
    pub confidence: f64,
    pub probabilities: ProbabilityDistribution,
    /// Raw model outputs, before softmax.
    pub logits: Vec<f32>,
}

impl ScoreOutput {
    /// Converts raw logits into a scored prediction.
    ///
    /// # Errors
    ///
    /// A post-processing error if the vector does not hold exactly
    /// [`NUM_CLASSES`] finite values.
    pub fn from_logits(logits: Vec<f32>) -> PlaneResult<Self> {
        if logits.len() != NUM_CLASSES {
            return Err(PlaneError::post_processing(
                "logit vector",
                &format!("expected {NUM_CLASSES} scores, got {}", logits.len()),
            ));
        }
        let probabilities = softmax(&logits)?;
        let class_id = probabilities.argmax();
        let plane = FetalPlane::from_class_id(class_id).ok_or_else(|| {
            PlaneError::post_processing("argmax", &format!("class id {class_id} out of range"))
        })?;

        Ok(Self {
            class_id,
            label: plane.label(),
            confidence: probabilities.as_slice()[class_id],
            probabilities,
            logits,
        })
    }

    /// The `k` most probable classes, highest first.
    pub fn top_k(&self, k: usize) -> Vec<ClassScore> {
        self.probabilities
            .top_k(k)
            .into_iter()
            .filter_map(|(class_id, probability)| {
                FetalPlane::from_class_id(class_id).map(|plane| ClassScore {
                    class_id,
                    label: plane.label(),
                    probability,
                })
            })
            .collect()
    }
}

/// Whether a handle can score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelStatus {
    Loaded { model_name: String },
    Unavailable { reason: String },
}

enum ModelState {
    Loaded(Box<dyn ScoringBackend>),
    Unavailable { reason: String },
}

/// Shared, read-only handle to the fetal plane classifier.
///
/// Scoring takes `&self`, so one handle can be put behind an `Arc` and used
/// from any number of threads.
pub struct ModelHandle {
    model_path: PathBuf,
    state: ModelState,
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("model_path", &self.model_path)
            .field("status", &self.status())
            .finish()
    }
}

impl ModelHandle {
    /// Loads the ONNX classifier at `model_path`.
    ///
    /// Failures are logged and captured in the returned handle rather than
    /// returned. A model whose declared output width is not [`NUM_CLASSES`] is
    /// treated as a load failure.
    pub fn load(model_path: impl AsRef<Path>, config: &ModelInferenceConfig) -> Self {
        let path = model_path.as_ref();
        if !path.exists() {
            let reason = format!("model file not found at {}", path.display());
            error!(model_path = %path.display(), "{reason}");
            return Self::unavailable(path, reason);
        }

        match OrtInfer::from_config(config, path) {
            Ok(engine) => match engine.output_len() {
                Some(n) if n != NUM_CLASSES => {
                    let reason =
                        format!("model declares {n} output classes, expected {NUM_CLASSES}");
                    error!(model_path = %path.display(), "{reason}");
                    Self::unavailable(path, reason)
                }
                _ => {
                    info!(
                        model_path = %path.display(),
                        model_name = engine.model_name(),
                        sessions = engine.pool_size(),
                        "loaded plane classifier"
                    );
                    Self::from_backend(path, Box::new(engine))
                }
            },
            Err(e) => {
                error!(model_path = %path.display(), error = %e, "failed to load plane classifier");
                Self::unavailable(path, e.to_string())
            }
        }
    }

    /// Wraps an already constructed backend.
    pub fn from_backend(model_path: impl AsRef<Path>, backend: Box<dyn ScoringBackend>) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
            state: ModelState::Loaded(backend),
        }
    }

    /// A handle that fails every scoring call.
    pub fn unavailable(model_path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
            state: ModelState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ModelState::Loaded(_))
    }

    /// Backend model name, when loaded.
    pub fn model_name(&self) -> Option<&str> {
        match &self.state {
            ModelState::Loaded(backend) => Some(backend.model_name()),
            ModelState::Unavailable { .. } => None,
        }
    }

    pub fn status(&self) -> ModelStatus {
        match &self.state {
            ModelState::Loaded(backend) => ModelStatus::Loaded {
                model_name: backend.model_name().to_string(),
            },
            ModelState::Unavailable { reason } => ModelStatus::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    /// Runs the classifier on a preprocessed tensor.
    ///
    /// # Errors
    ///
    /// * `PlaneError::ModelNotLoaded` if the handle is unavailable
    /// * The backend's error if the forward pass fails
    /// * A post-processing error if the output has the wrong length or holds a
    ///   non-finite value
    pub fn score(&self, input: &ModelInputTensor) -> PlaneResult<ScoreOutput> {
        let backend = match &self.state {
            ModelState::Loaded(backend) => backend,
            ModelState::Unavailable { reason } => {
                return Err(PlaneError::model_not_loaded(&self.model_path, reason.clone()));
            }
        };

        let logits = backend.forward(input)?;
        debug!(model_name = backend.model_name(), ?logits, "raw scores");
        ScoreOutput::from_logits(logits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ErrorKind, SimpleError};
    use crate::processors::normalize;
    use image::{Rgb, RgbImage};
    use std::sync::Arc;

    #[derive(Debug)]
    struct FixedBackend(Vec<f32>);

    impl ScoringBackend for FixedBackend {
        fn forward(&self, _input: &ModelInputTensor) -> PlaneResult<Vec<f32>> {
            Ok(self.0.clone())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    #[derive(Debug)]
    struct FailingBackend;

    impl ScoringBackend for FailingBackend {
        fn forward(&self, _input: &ModelInputTensor) -> PlaneResult<Vec<f32>> {
            Err(PlaneError::scoring_error(
                "failing",
                "forward pass",
                SimpleError::new("backend exploded"),
            ))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn input() -> ModelInputTensor {
        normalize(&RgbImage::from_pixel(100, 100, Rgb([128, 128, 128])))
    }

    fn fixed(logits: Vec<f32>) -> ModelHandle {
        ModelHandle::from_backend("fixed.onnx", Box::new(FixedBackend(logits)))
    }

    #[test]
    fn test_score_with_fixed_logits() {
        let handle = fixed(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let out = handle.score(&input()).unwrap();
        assert_eq!(out.class_id, 0);
        assert_eq!(out.label, "Abdominal");
        assert!((out.confidence - 0.35218742835175143).abs() < 1e-12);
        assert_eq!(out.confidence, out.probabilities.as_slice()[out.class_id]);
        assert_eq!(out.logits, vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_score_is_deterministic() {
        let handle = fixed(vec![0.3, -1.0, 2.5, 0.0, 0.1, 2.4]);
        let tensor = input();
        let first = handle.score(&tensor).unwrap();
        for _ in 0..5 {
            assert_eq!(handle.score(&tensor).unwrap(), first);
        }
        assert_eq!(first.label, "Cervix");
    }

    #[test]
    fn test_tie_break_picks_lowest_class() {
        let handle = fixed(vec![0.0, 0.0, 0.0, 4.0, 0.0, 4.0]);
        let out = handle.score(&input()).unwrap();
        assert_eq!(out.class_id, 3);
        assert_eq!(out.label, "Femur");
    }

    #[test]
    fn test_missing_model_is_unavailable() {
        let handle = ModelHandle::load(
            "does/not/exist/model.onnx",
            &ModelInferenceConfig::default(),
        );
        assert!(!handle.is_loaded());
        assert!(handle.model_name().is_none());
        assert!(matches!(handle.status(), ModelStatus::Unavailable { .. }));

        let tensor = input();
        for _ in 0..3 {
            let err = handle.score(&tensor).unwrap_err();
            assert!(matches!(err, PlaneError::ModelNotLoaded { .. }));
            assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
        }
    }

    #[test]
    fn test_corrupt_model_is_unavailable() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".onnx").tempfile().unwrap();
        file.write_all(b"not an onnx graph").unwrap();

        let handle = ModelHandle::load(file.path(), &ModelInferenceConfig::default());
        assert!(!handle.is_loaded());
        assert!(matches!(
            handle.score(&input()),
            Err(PlaneError::ModelNotLoaded { .. })
        ));
    }

    #[test]
    fn test_wrong_output_length_is_internal() {
        let handle = fixed(vec![1.0, 2.0, 3.0]);
        let err = handle.score(&input()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_non_finite_output_is_internal() {
        let handle = fixed(vec![0.0, f32::NAN, 0.0, 0.0, 0.0, 0.0]);
        let err = handle.score(&input()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_backend_error_propagates() {
        let handle = ModelHandle::from_backend("failing.onnx", Box::new(FailingBackend));
        let err = handle.score(&input()).unwrap_err();
        assert!(matches!(err, PlaneError::Scoring { .. }));
    }

    #[test]
    fn test_top_k_labels() {
        let out = ScoreOutput::from_logits(vec![0.0, 3.0, 0.0, 0.0, 0.0, 2.0]).unwrap();
        let top = out.top_k(2);
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].class_id, top[0].label), (1, "Brain"));
        assert_eq!((top[1].class_id, top[1].label), (5, "Thorax"));
    }

    #[test]
    fn test_concurrent_scoring_shares_handle() {
        let handle = Arc::new(fixed(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0]));
        let tensor = input();
        std::thread::scope(|s| {
            for _ in 0..4 {
                let handle = Arc::clone(&handle);
                let tensor = &tensor;
                s.spawn(move || {
                    let out = handle.score(tensor).unwrap();
                    assert_eq!(out.class_id, 5);
                });
            }
        });
    }
}
