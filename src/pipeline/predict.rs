//! End-to-end prediction over raw image bytes.

use crate::core::errors::{PlaneError, PlaneResult};
use crate::models::{ModelHandle, ScoreOutput};
use crate::pipeline::result::{PredictionResponse, assemble};
use crate::processors::{Preprocessor, estimate, explain};
use crate::utils::load_image_from_bytes;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Response plus the full scores behind it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub response: PredictionResponse,
    pub scores: ScoreOutput,
}

/// Runs the whole classification pipeline for one image at a time.
///
/// Cheap to clone; clones share the model handle. The pipeline holds no
/// mutable state, so concurrent calls need no coordination.
#[derive(Debug, Clone)]
pub struct PlanePipeline {
    model: Arc<ModelHandle>,
    preprocessor: Preprocessor,
}

fn log_failure(err: &PlaneError) {
    match err {
        PlaneError::ImageDecode { .. } | PlaneError::InvalidInput { .. } => {
            warn!(stage = %err.stage(), error = %err, "rejected input");
        }
        _ => {
            error!(stage = %err.stage(), error = ?err, "prediction failed");
        }
    }
}

impl PlanePipeline {
    pub fn new(model: Arc<ModelHandle>) -> Self {
        Self::with_preprocessor(model, Preprocessor::default())
    }

    pub fn with_preprocessor(model: Arc<ModelHandle>, preprocessor: Preprocessor) -> Self {
        Self {
            model,
            preprocessor,
        }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    /// Classifies an encoded image.
    ///
    /// # Errors
    ///
    /// * `PlaneError::ImageDecode` if the bytes are not a decodable image
    /// * `PlaneError::ModelNotLoaded` if the model handle is unavailable
    /// * Any scoring, numeric, explanation or assembly error
    ///
    /// Every error is logged with its stage before it is returned.
    pub fn predict(&self, image_bytes: &[u8]) -> PlaneResult<PredictionResponse> {
        self.predict_with_scores(image_bytes).map(|out| out.response)
    }

    /// Like [`predict`](Self::predict), also returning the full score output.
    pub fn predict_with_scores(&self, image_bytes: &[u8]) -> PlaneResult<PipelineOutput> {
        self.run(image_bytes).inspect_err(log_failure)
    }

    fn run(&self, image_bytes: &[u8]) -> PlaneResult<PipelineOutput> {
        let start = Instant::now();

        let image = load_image_from_bytes(image_bytes)?;
        let (width, height) = image.dimensions();
        debug!(width, height, bytes = image_bytes.len(), "decoded image");

        let tensor = self.preprocessor.normalize(&image);
        let scores = self.model.score(&tensor)?;
        let scored_at = start.elapsed();

        let (uncertainty, explanation) = rayon::join(
            || estimate(&scores.probabilities),
            || explain(width, height, scores.class_id),
        );
        let response = assemble(&scores, uncertainty, explanation?)?;
        debug!(
            class_id = scores.class_id,
            label = scores.label,
            confidence = scores.confidence,
            scoring_ms = scored_at.as_secs_f64() * 1000.0,
            total_ms = start.elapsed().as_secs_f64() * 1000.0,
            "prediction complete"
        );

        Ok(PipelineOutput { response, scores })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::core::traits::ScoringBackend;
    use crate::processors::ModelInputTensor;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[derive(Debug)]
    struct FixedBackend(Vec<f32>);

    impl ScoringBackend for FixedBackend {
        fn forward(&self, input: &ModelInputTensor) -> PlaneResult<Vec<f32>> {
            assert_eq!(input.shape(), [1, 3, 224, 224]);
            Ok(self.0.clone())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn pipeline(logits: Vec<f32>) -> PlanePipeline {
        let handle = ModelHandle::from_backend("fixed.onnx", Box::new(FixedBackend(logits)));
        PlanePipeline::new(Arc::new(handle))
    }

    fn solid_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb([90, 90, 90]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_end_to_end_reference_image() {
        let pipe = pipeline(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let response = pipe.predict(&solid_png(100, 100)).unwrap();

        assert_eq!(response.prediction.class_id, 0);
        assert_eq!(response.prediction.label, "Abdominal");
        assert!((response.prediction.confidence - 0.35218742835175143).abs() < 1e-9);
        assert!((response.uncertainty.predictive_entropy - 1.691404349234106).abs() < 1e-6);
        assert_eq!(
            response.uncertainty.calibrated_confidence,
            response.prediction.confidence
        );
        assert_eq!(response.explanation, explain(100, 100, 0).unwrap());
    }

    #[test]
    fn test_repeated_predictions_are_identical() {
        let pipe = pipeline(vec![0.2, 1.3, -0.4, 0.0, 0.9, 1.1]);
        let bytes = solid_png(64, 32);
        let first = pipe.predict_with_scores(&bytes).unwrap();
        let second = pipe.predict_with_scores(&bytes).unwrap();
        assert_eq!(first.response, second.response);
        assert_eq!(first.scores, second.scores);
        assert_eq!(first.response.prediction.class_id, 1);
    }

    #[test]
    fn test_explanation_uses_original_dimensions() {
        let pipe = pipeline(vec![0.0, 0.0, 0.0, 0.0, 0.0, 3.0]);
        let response = pipe.predict(&solid_png(120, 45)).unwrap();
        assert_eq!(response.explanation, explain(120, 45, 5).unwrap());
    }

    #[test]
    fn test_text_bytes_are_client_errors() {
        let pipe = pipeline(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let err = pipe.predict(b"hello, not an image").unwrap_err();
        assert!(matches!(err, PlaneError::ImageDecode { .. }));
        assert_eq!(err.kind(), ErrorKind::ClientInput);
    }

    #[test]
    fn test_unavailable_model() {
        let handle = ModelHandle::unavailable("missing.onnx", "model file not found");
        let pipe = PlanePipeline::new(Arc::new(handle));
        let err = pipe.predict(&solid_png(10, 10)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
    }

    #[test]
    fn test_bad_model_output_is_internal() {
        let pipe = pipeline(vec![1.0, 2.0]);
        let err = pipe.predict(&solid_png(10, 10)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
