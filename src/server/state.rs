//! Shared state for the HTTP handlers.

use crate::core::config::ServiceConfig;
use crate::models::ModelHandle;
use crate::pipeline::PlanePipeline;
use std::sync::Arc;

/// Cloned into every handler; all fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: PlanePipeline,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(config: ServiceConfig, model: Arc<ModelHandle>) -> Self {
        Self {
            pipeline: PlanePipeline::new(model),
            config: Arc::new(config),
        }
    }

    pub fn model(&self) -> &ModelHandle {
        self.pipeline.model()
    }
}
