//! Softmax and probability-vector utilities.
//!
//! All arithmetic runs in `f64` so that the probabilities of a six-way
//! classifier sum to one within `1e-6` regardless of logit magnitude.

use crate::core::constants::PROBABILITY_SUM_TOLERANCE;
use crate::core::errors::{PlaneError, PlaneResult};

/// A validated probability vector.
///
/// Every entry is finite and in `[0, 1]`, and the entries sum to one within
/// [`PROBABILITY_SUM_TOLERANCE`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityDistribution {
    probs: Vec<f64>,
}

impl ProbabilityDistribution {
    /// Wraps an existing probability vector after checking it.
    pub fn from_probabilities(probs: Vec<f64>) -> PlaneResult<Self> {
        if probs.is_empty() {
            return Err(PlaneError::post_processing(
                "probability vector",
                "empty probability vector",
            ));
        }
        if let Some((i, p)) = probs
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0 || **p > 1.0)
        {
            return Err(PlaneError::post_processing(
                "probability vector",
                &format!("entry {i} out of range: {p}"),
            ));
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(PlaneError::post_processing(
                "probability vector",
                &format!("entries sum to {sum}, expected 1"),
            ));
        }
        Ok(Self { probs })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Index of the largest probability; ties go to the lowest index.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.probs.iter().enumerate().skip(1) {
            if p > self.probs[best] {
                best = i;
            }
        }
        best
    }

    /// The largest probability.
    pub fn max(&self) -> f64 {
        self.probs[self.argmax()]
    }

    /// The `k` most probable `(class_id, probability)` pairs, highest first.
    ///
    /// Equal probabilities keep their class order. `k` larger than the vector
    /// is clamped.
    pub fn top_k(&self, k: usize) -> Vec<(usize, f64)> {
        let mut indexed: Vec<(usize, f64)> = self.probs.iter().copied().enumerate().collect();
        // Stable sort keeps lower class ids ahead on ties.
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.truncate(k.min(self.probs.len()));
        indexed
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.probs
    }
}

/// Numerically stable softmax.
///
/// # Errors
///
/// A post-processing error if `logits` is empty or holds a non-finite value.
pub fn softmax(logits: &[f32]) -> PlaneResult<ProbabilityDistribution> {
    softmax_scaled(logits, 1.0)
}

/// Softmax over `logits / temperature`.
///
/// A temperature of `1.0` is the plain softmax. Values above one flatten the
/// distribution, values below one sharpen it.
///
/// # Errors
///
/// A post-processing error if the temperature is not a positive finite number,
/// or if `logits` is empty or holds a non-finite value.
pub fn apply_temperature_scaling(
    logits: &[f32],
    temperature: f64,
) -> PlaneResult<ProbabilityDistribution> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(PlaneError::post_processing(
            "temperature scaling",
            &format!("temperature must be positive, got {temperature}"),
        ));
    }
    softmax_scaled(logits, temperature)
}

fn softmax_scaled(logits: &[f32], temperature: f64) -> PlaneResult<ProbabilityDistribution> {
    if logits.is_empty() {
        return Err(PlaneError::post_processing("softmax", "empty logit vector"));
    }
    if let Some(i) = logits.iter().position(|l| !l.is_finite()) {
        return Err(PlaneError::post_processing(
            "softmax",
            &format!("non-finite logit at index {i}: {}", logits[i]),
        ));
    }

    let scaled: Vec<f64> = logits.iter().map(|&l| l as f64 / temperature).collect();
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scaled.iter().map(|&v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    let probs = exps.into_iter().map(|e| e / sum).collect();

    ProbabilityDistribution::from_probabilities(probs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;

    fn sums_to_one(dist: &ProbabilityDistribution) -> bool {
        (dist.as_slice().iter().sum::<f64>() - 1.0).abs() <= 1e-6
    }

    #[test]
    fn test_softmax_reference_value() {
        let dist = softmax(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        assert!((dist.as_slice()[0] - 0.35218742835175143).abs() < 1e-12);
        assert_eq!(dist.argmax(), 0);
        assert!(sums_to_one(&dist));
    }

    #[test]
    fn test_softmax_is_stable_for_large_logits() {
        let dist = softmax(&[1000.0, 999.0, -1000.0, 0.0, 500.0, 1000.0]).unwrap();
        assert!(dist.as_slice().iter().all(|p| p.is_finite()));
        assert!(sums_to_one(&dist));
        assert!((dist.as_slice()[0] - dist.as_slice()[5]).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_logits_give_uniform_probabilities() {
        let dist = softmax(&[3.5; 6]).unwrap();
        for &p in dist.as_slice() {
            assert!((p - 1.0 / 6.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_argmax_tie_goes_to_lowest_index() {
        let dist = softmax(&[0.0, 2.0, 2.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(dist.argmax(), 1);

        let uniform = softmax(&[0.0; 6]).unwrap();
        assert_eq!(uniform.argmax(), 0);
    }

    #[test]
    fn test_non_finite_logits_are_rejected() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let err = softmax(&[0.0, bad, 1.0]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Internal);
        }
        assert!(softmax(&[]).is_err());
    }

    #[test]
    fn test_temperature_scaling() {
        let logits = [2.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let plain = softmax(&logits).unwrap();
        let same = apply_temperature_scaling(&logits, 1.0).unwrap();
        assert_eq!(plain, same);

        let flat = apply_temperature_scaling(&logits, 2.0).unwrap();
        assert!(flat.max() < plain.max());
        assert_eq!(flat.argmax(), plain.argmax());

        assert!(apply_temperature_scaling(&logits, 0.0).is_err());
        assert!(apply_temperature_scaling(&logits, -1.5).is_err());
    }

    #[test]
    fn test_top_k_orders_and_clamps() {
        let dist = ProbabilityDistribution::from_probabilities(vec![0.1, 0.4, 0.1, 0.4]).unwrap();
        let top = dist.top_k(3);
        assert_eq!(top.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 3, 0]);
        assert_eq!(dist.top_k(10).len(), 4);
        assert!(dist.top_k(0).is_empty());
    }

    #[test]
    fn test_from_probabilities_validates() {
        assert!(ProbabilityDistribution::from_probabilities(vec![0.5, 0.6]).is_err());
        assert!(ProbabilityDistribution::from_probabilities(vec![1.5, -0.5]).is_err());
        assert!(ProbabilityDistribution::from_probabilities(vec![]).is_err());
        assert!(ProbabilityDistribution::from_probabilities(vec![1.0]).is_ok());
    }
}
