//! The fixed set of anatomical planes the classifier distinguishes.

use crate::core::constants::{DEFAULT_ATTENTION_CENTER, NUM_CLASSES, PLANE_LABELS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ultrasound plane, in the order the model emits its logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetalPlane {
    Abdominal,
    Brain,
    Cervix,
    Femur,
    Other,
    Thorax,
}

impl FetalPlane {
    /// Every plane, indexed by class id.
    pub const ALL: [FetalPlane; NUM_CLASSES] = [
        FetalPlane::Abdominal,
        FetalPlane::Brain,
        FetalPlane::Cervix,
        FetalPlane::Femur,
        FetalPlane::Other,
        FetalPlane::Thorax,
    ];

    /// Looks a plane up by its position in the model output.
    pub fn from_class_id(class_id: usize) -> Option<Self> {
        Self::ALL.get(class_id).copied()
    }

    /// Position of the plane in the model output.
    pub fn class_id(self) -> usize {
        self as usize
    }

    /// Display label, as reported in predictions.
    pub fn label(self) -> &'static str {
        PLANE_LABELS[self.class_id()]
    }

    /// Where the synthetic saliency map centres its attention, as
    /// `(x, y)` fractions of the image width and height.
    pub fn attention_center(self) -> (f64, f64) {
        match self {
            FetalPlane::Abdominal => (0.5, 0.5),
            FetalPlane::Brain => (0.5, 0.4),
            FetalPlane::Cervix => (0.5, 0.8),
            FetalPlane::Femur => (0.3, 0.6),
            FetalPlane::Other => (0.5, 0.5),
            FetalPlane::Thorax => (0.6, 0.4),
        }
    }
}

/// Attention centre for a raw class id. Ids outside the class table map to
/// the image centre.
pub fn attention_center_for(class_id: usize) -> (f64, f64) {
    FetalPlane::from_class_id(class_id)
        .map(FetalPlane::attention_center)
        .unwrap_or(DEFAULT_ATTENTION_CENTER)
}

impl fmt::Display for FetalPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FetalPlane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|plane| plane.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown plane label '{wanted}'"))
    }
}
