//! Domain-level structures shared across the pipeline.
//!
//! This module holds the anatomical plane taxonomy: class order, labels and
//! the attention centres the explanation generator draws from.

pub mod plane;

pub use plane::{FetalPlane, attention_center_for};
