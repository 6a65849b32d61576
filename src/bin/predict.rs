//! Offline fetal plane classification.
//!
//! Runs the full pipeline over image files and prints one JSON response per
//! image to stdout.
//!
//! Usage:
//! ```
//! fetal-plane-predict --model-path models/plane.onnx scan1.png scan2.jpg
//! fetal-plane-predict --model-path models/plane.onnx --top-k 3 --pretty scan.png
//! ```

use clap::Parser;
use fetal_plane::core::config::{ConfigValidator, LogFormat, ServiceConfig};
use fetal_plane::core::init_tracing;
use fetal_plane::models::ModelHandle;
use fetal_plane::pipeline::PlanePipeline;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Command-line arguments for offline prediction
#[derive(Parser)]
#[command(name = "fetal-plane-predict")]
#[command(about = "Classifies ultrasound images and prints JSON results")]
struct Args {
    /// Path to the ONNX model
    #[arg(short, long, env = "FETAL_PLANE_MODEL_PATH")]
    model_path: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image files to classify
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Also report the k most probable classes
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log output format (text or json); logs go to stderr
    #[arg(long)]
    log_format: Option<LogFormat>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if let Some(path) = args.model_path {
        config.model_path = path;
    }
    if let Some(format) = args.log_format {
        config.log_format = format;
    }
    config.validate()?;

    init_tracing(config.log_format);
    config.resolve_calibration()?;

    let handle = ModelHandle::load(&config.model_path, &config.inference_config());
    if !handle.is_loaded() {
        error!(status = ?handle.status(), "model unavailable");
        return Err("model unavailable".into());
    }
    let pipeline = PlanePipeline::new(Arc::new(handle));

    let mut failures = 0usize;
    for path in &args.images {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to read image");
                failures += 1;
                continue;
            }
        };

        match pipeline.predict_with_scores(&bytes) {
            Ok(output) => {
                let mut value = json!({
                    "image": path.display().to_string(),
                    "result": output.response,
                });
                if let Some(k) = args.top_k {
                    value["top_k"] = serde_json::to_value(output.scores.top_k(k))?;
                }
                let line = if args.pretty {
                    serde_json::to_string_pretty(&value)?
                } else {
                    serde_json::to_string(&value)?
                };
                println!("{line}");
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "prediction failed");
                failures += 1;
            }
        }
    }

    info!(
        total = args.images.len(),
        failed = failures,
        "finished"
    );
    if failures > 0 {
        return Err(format!("{failures} image(s) failed").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_flag_is_optional() {
        let args = Args::try_parse_from(["fetal-plane-predict", "scan.png"]).unwrap();
        assert!(args.log_format.is_none());

        let args = Args::try_parse_from([
            "fetal-plane-predict",
            "--log-format",
            "json",
            "scan.png",
        ])
        .unwrap();
        assert_eq!(args.log_format, Some(LogFormat::Json));
    }
}
