//! Classification models.
//!
//! This module contains the fetal plane classifier handle.

pub mod plane_classifier;

pub use plane_classifier::{ClassScore, ModelHandle, ModelStatus, ScoreOutput};
