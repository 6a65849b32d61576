use super::*;
use crate::core::config::{ModelInferenceConfig, OrtGraphOptimizationLevel, OrtSessionConfig};
use crate::core::errors::SimpleError;
use crate::core::inference::session;
use ort::logging::LogLevel;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use std::path::Path;
use std::sync::Mutex;

impl OrtInfer {
    /// Creates an engine with default ONNX Runtime settings and a single session.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, PlaneError> {
        Self::from_config(&ModelInferenceConfig::default(), model_path)
    }

    /// Creates an engine from a [`ModelInferenceConfig`], applying the ORT session
    /// settings to every pooled session.
    ///
    /// The input name comes from the configuration or, when unset, from the
    /// model's first declared input. The output is always the first declared
    /// output.
    pub fn from_config(
        common: &ModelInferenceConfig,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, PlaneError> {
        let path = model_path.as_ref();
        let pool_size = common.session_pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let session = session::load_session_with(
                path,
                |builder| match &common.ort_session {
                    Some(cfg) => Self::apply_ort_config(builder, cfg),
                    // Keep ORT's own logging quiet unless asked otherwise
                    None => builder.with_log_level(LogLevel::Error),
                },
                Some("check the model file and session configuration"),
            )?;
            sessions.push(session);
        }

        let first = sessions.first().ok_or_else(|| {
            PlaneError::model_load_error(path, "no session created", None, None::<SimpleError>)
        })?;

        let input_name = match &common.input_name {
            Some(name) => name.clone(),
            None => first
                .inputs
                .first()
                .map(|input| input.name.clone())
                .ok_or_else(|| {
                    PlaneError::model_load_error(
                        path,
                        "model declares no inputs",
                        Some("export the classifier with a single image input"),
                        None::<SimpleError>,
                    )
                })?,
        };

        let output = first.outputs.first().ok_or_else(|| {
            PlaneError::model_load_error(
                path,
                "model declares no outputs",
                Some("model may be invalid or corrupted"),
                None::<SimpleError>,
            )
        })?;
        let output_name = output.name.clone();
        let output_len = tensor_shape(&output.output_type)
            .as_deref()
            .and_then(static_class_count);

        let model_name = common
            .model_name
            .clone()
            .or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "unknown_model".to_string());

        Ok(OrtInfer {
            sessions: sessions.into_iter().map(Mutex::new).collect(),
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name,
            output_name,
            output_len,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    fn apply_ort_config(
        mut builder: SessionBuilder,
        cfg: &OrtSessionConfig,
    ) -> Result<SessionBuilder, ort::Error> {
        builder = builder.with_log_level(LogLevel::Error)?;
        if let Some(intra) = cfg.intra_threads {
            builder = builder.with_intra_threads(intra)?;
        }
        if let Some(inter) = cfg.inter_threads {
            builder = builder.with_inter_threads(inter)?;
        }
        if let Some(level) = cfg.optimization_level {
            let mapped = match level {
                OrtGraphOptimizationLevel::DisableAll => GraphOptimizationLevel::Disable,
                OrtGraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
                OrtGraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
                OrtGraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
            };
            builder = builder.with_optimization_level(mapped)?;
        }
        Ok(builder)
    }
}
