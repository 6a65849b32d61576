//! The prediction pipeline.
//!
//! This module chains the stages that turn uploaded bytes into a response:
//! decode, preprocess, score, then uncertainty and explanation side by side,
//! and finally assembly into a [`PredictionResponse`].

pub mod predict;
pub mod result;

pub use predict::{PipelineOutput, PlanePipeline};
pub use result::{PredictionResponse, PredictionResult, assemble};
