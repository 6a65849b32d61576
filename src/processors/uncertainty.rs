//! Uncertainty estimation from a probability distribution.

use crate::core::constants::ENTROPY_EPSILON;
use crate::processors::probability::ProbabilityDistribution;
use serde::{Deserialize, Serialize};

/// Summary uncertainty for one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyMetrics {
    /// Shannon entropy of the distribution in nats, `>= 0`.
    pub predictive_entropy: f64,
    /// The winning probability. No calibration is applied here, so this equals
    /// the prediction confidence.
    pub calibrated_confidence: f64,
}

/// Shannon entropy `-sum(p * ln(p + eps))`, clamped at zero.
///
/// The epsilon keeps zero entries finite; it can push a one-hot result a hair
/// below zero, hence the clamp.
pub fn predictive_entropy(probs: &[f64]) -> f64 {
    let h: f64 = -probs
        .iter()
        .map(|&p| p * (p + ENTROPY_EPSILON).ln())
        .sum::<f64>();
    h.max(0.0)
}

/// Entropy of the uniform distribution over `n` classes.
pub fn max_entropy(n: usize) -> f64 {
    if n == 0 { 0.0 } else { (n as f64).ln() }
}

/// Computes [`UncertaintyMetrics`] for a distribution.
pub fn estimate(dist: &ProbabilityDistribution) -> UncertaintyMetrics {
    UncertaintyMetrics {
        predictive_entropy: predictive_entropy(dist.as_slice()),
        calibrated_confidence: dist.max(),
    }
}
