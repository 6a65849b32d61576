//! Fetal plane classification HTTP service.
//!
//! Usage:
//! ```
//! fetal-plane-server --config service.json
//! fetal-plane-server --model-path models/plane.onnx --bind 127.0.0.1:8000
//! ```
//!
//! Settings come from defaults, then the optional JSON file, then
//! `FETAL_PLANE_*` environment variables, then the flags below.

use clap::Parser;
use fetal_plane::core::config::{ConfigValidator, LogFormat, ServiceConfig};
use fetal_plane::core::init_tracing;
use fetal_plane::models::ModelHandle;
use fetal_plane::server::{AppState, serve};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Command-line arguments for the service
#[derive(Parser)]
#[command(name = "fetal-plane-server")]
#[command(about = "Serves fetal ultrasound plane predictions over HTTP")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the ONNX model
    #[arg(short, long)]
    model_path: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8000
    #[arg(short, long)]
    bind: Option<String>,

    /// Number of ONNX Runtime sessions in the pool
    #[arg(long)]
    session_pool_size: Option<usize>,

    /// Log output format (text or json)
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if let Some(path) = args.model_path {
        config.model_path = path;
    }
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(size) = args.session_pool_size {
        config.session_pool_size = size;
    }
    if let Some(format) = args.log_format {
        config.log_format = format;
    }
    config.validate()?;

    init_tracing(config.log_format);
    config.resolve_calibration()?;
    info!(
        service = %config.project_name,
        version = %config.version,
        model_path = %config.model_path.display(),
        temperature = ?config.temperature,
        "starting"
    );

    if !config.model_path.exists() {
        warn!(
            model_path = %config.model_path.display(),
            "Model not found. Inference will fail until model is present."
        );
    }

    // Loading is off the async runtime; session creation can take a while.
    let model_path = config.model_path.clone();
    let inference = config.inference_config();
    let handle =
        tokio::task::spawn_blocking(move || ModelHandle::load(model_path, &inference)).await?;

    serve(AppState::new(config, Arc::new(handle))).await?;
    Ok(())
}
