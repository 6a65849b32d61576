//! Response assembly.

use crate::core::constants::{NUM_CLASSES, PROBABILITY_SUM_TOLERANCE};
use crate::core::errors::{PlaneError, PlaneResult};
use crate::domain::FetalPlane;
use crate::models::ScoreOutput;
use crate::processors::{ExplanationArtifact, UncertaintyMetrics};
use serde::{Deserialize, Serialize};

/// The top-1 prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    pub class_id: usize,
    pub confidence: f64,
}

/// Everything returned for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: PredictionResult,
    pub uncertainty: UncertaintyMetrics,
    pub explanation: ExplanationArtifact,
}

fn inconsistent(message: &str) -> PlaneError {
    PlaneError::assembly_error("prediction response", message)
}

/// Builds the response after checking that the parts agree with each other.
///
/// # Errors
///
/// An assembly error if the probability vector has the wrong length, the class
/// id is out of range, the label does not belong to the class id, or the
/// confidence is not the probability of the predicted class.
pub fn assemble(
    scores: &ScoreOutput,
    uncertainty: UncertaintyMetrics,
    explanation: ExplanationArtifact,
) -> PlaneResult<PredictionResponse> {
    let probs = scores.probabilities.as_slice();
    if probs.len() != NUM_CLASSES {
        return Err(inconsistent(&format!(
            "expected {NUM_CLASSES} probabilities, got {}",
            probs.len()
        )));
    }

    let plane = FetalPlane::from_class_id(scores.class_id)
        .ok_or_else(|| inconsistent(&format!("class id {} out of range", scores.class_id)))?;
    if plane.label() != scores.label {
        return Err(inconsistent(&format!(
            "label '{}' does not match class id {}",
            scores.label, scores.class_id
        )));
    }
    if (probs[scores.class_id] - scores.confidence).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(inconsistent(&format!(
            "confidence {} differs from p[{}] = {}",
            scores.confidence, scores.class_id, probs[scores.class_id]
        )));
    }

    Ok(PredictionResponse {
        prediction: PredictionResult {
            label: plane.label().to_string(),
            class_id: scores.class_id,
            confidence: scores.confidence,
        },
        uncertainty,
        explanation,
    })
}
