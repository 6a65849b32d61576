//! HTTP surface for the classifier (feature `server`).
//!
//! Routes, all under the configured API prefix except `/`:
//! - `GET /healthz` liveness probe
//! - `GET /metadata` service and model information
//! - `POST /predict` multipart `file` field or raw image body in, [`PredictionResponse`](crate::pipeline::PredictionResponse) out

pub mod handlers;
pub mod middleware;
pub mod state;

pub use handlers::{ApiError, MetadataResponse};
pub use state::AppState;

use crate::core::errors::PlaneResult;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tracing::info;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/metadata", get(handlers::metadata))
        .route("/predict", post(handlers::predict));

    Router::new()
        .route("/", get(handlers::root))
        .nest(&state.config.api_prefix, api)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(middleware::cors_layer(&state.config.cors_origins))
        .layer(axum::middleware::from_fn(middleware::request_id))
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(state: AppState) -> PlaneResult<()> {
    let bind_address = state.config.bind_address.clone();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(
        address = %listener.local_addr()?,
        prefix = %state.config.api_prefix,
        model_loaded = state.model().is_loaded(),
        "listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
