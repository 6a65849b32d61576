//! HTTP handlers.

use crate::core::constants::PLANE_LABELS;
use crate::core::errors::{ErrorKind, PlaneError};
use crate::pipeline::PredictionResponse;
use crate::server::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

pub const SERVICE_DESCRIPTION: &str = "Fetal Plane Classification Demo (Research Only)";

/// Error body returned to clients: `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<PlaneError> for ApiError {
    fn from(err: PlaneError) -> Self {
        let status = match err.kind() {
            ErrorKind::ClientInput => StatusCode::BAD_REQUEST,
            ErrorKind::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.public_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub service: String,
    pub version: String,
    pub model_mode: &'static str,
    pub model_name: Option<String>,
    pub classes: Vec<&'static str>,
    pub temperature: Option<f64>,
    pub calibration_applied: bool,
    pub description: &'static str,
}

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": format!(
            "{} API. See {}/metadata for service details.",
            state.config.project_name, state.config.api_prefix
        )
    }))
}

/// Liveness probe. Reports ok even when the model is unavailable.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metadata(State(state): State<AppState>) -> Json<MetadataResponse> {
    let model = state.model();
    Json(MetadataResponse {
        service: state.config.project_name.clone(),
        version: state.config.version.clone(),
        model_mode: if model.is_loaded() { "onnx" } else { "unavailable" },
        model_name: model.model_name().map(str::to_string),
        classes: PLANE_LABELS.to_vec(),
        temperature: state.config.temperature,
        // The temperature is reported for reference; scoring never applies it.
        calibration_applied: false,
        description: SERVICE_DESCRIPTION,
    })
}

fn request_content_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

fn is_image(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// Reads the `file` field of a `multipart/form-data` upload.
async fn read_multipart_file(state: &AppState, req: Request) -> Result<Bytes, ApiError> {
    let mut multipart = Multipart::from_request(req, state)
        .await
        .map_err(|rej| ApiError::new(rej.status(), rej.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if !field.content_type().is_some_and(is_image) {
            return Err(ApiError::bad_request("File must be an image"));
        }
        return field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()));
    }

    Err(ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Field 'file' is required",
    ))
}

/// Classifies an uploaded image.
///
/// Accepts a `multipart/form-data` body with the image in a `file` field, or
/// the raw image as the body with an `image/*` content type.
pub async fn predict(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<PredictionResponse>, ApiError> {
    let content_type = request_content_type(req.headers());
    let body = if content_type.starts_with("multipart/form-data") {
        read_multipart_file(&state, req).await?
    } else if is_image(&content_type) {
        Bytes::from_request(req, &state)
            .await
            .map_err(|rej| ApiError::new(rej.status(), rej.body_text()))?
    } else {
        return Err(ApiError::bad_request("File must be an image"));
    };
    if body.is_empty() {
        return Err(ApiError::bad_request("Empty image payload"));
    }

    let pipeline = state.pipeline.clone();
    let response = tokio::task::spawn_blocking(move || pipeline.predict(&body))
        .await
        .map_err(|e| {
            error!(error = %e, "prediction task did not complete");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed")
        })??;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ServiceConfig;
    use crate::core::errors::PlaneResult;
    use crate::core::traits::ScoringBackend;
    use crate::models::ModelHandle;
    use crate::processors::ModelInputTensor;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;

    #[derive(Debug)]
    struct FixedBackend;

    impl ScoringBackend for FixedBackend {
        fn forward(&self, _input: &ModelInputTensor) -> PlaneResult<Vec<f32>> {
            Ok(vec![0.0, 2.0, 0.0, 0.0, 0.0, 0.0])
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn loaded_state() -> AppState {
        let handle = ModelHandle::from_backend("fixed.onnx", Box::new(FixedBackend));
        AppState::new(ServiceConfig::default(), Arc::new(handle))
    }

    fn unavailable_state() -> AppState {
        let handle = ModelHandle::unavailable("missing.onnx", "model file not found");
        AppState::new(ServiceConfig::default(), Arc::new(handle))
    }

    fn png_body() -> Vec<u8> {
        let img = RgbImage::from_pixel(20, 20, Rgb([30, 60, 90]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn raw_request(content_type: Option<&str>, body: Vec<u8>) -> Request {
        let mut builder = HttpRequest::builder().method("POST").uri("/predict");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    const BOUNDARY: &str = "plane-upload-boundary";

    fn multipart_request(field: &str, part_type: &str, data: &[u8]) -> Request {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"scan.png\"\r\nContent-Type: {part_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        raw_request(
            Some(&format!("multipart/form-data; boundary={BOUNDARY}")),
            body,
        )
    }

    async fn error_parts(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_healthz() {
        let Json(body) = healthz().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_metadata_reports_model_mode() {
        let Json(loaded) = metadata(State(loaded_state())).await;
        assert_eq!(loaded.model_mode, "onnx");
        assert_eq!(loaded.model_name.as_deref(), Some("fixed"));
        assert_eq!(loaded.classes.len(), 6);
        assert!(!loaded.calibration_applied);
        assert_eq!(loaded.description, SERVICE_DESCRIPTION);

        let Json(missing) = metadata(State(unavailable_state())).await;
        assert_eq!(missing.model_mode, "unavailable");
        assert!(missing.model_name.is_none());
    }

    #[tokio::test]
    async fn test_predict_success() {
        let Json(response) = predict(
            State(loaded_state()),
            raw_request(Some("image/png"), png_body()),
        )
        .await
        .unwrap();
        assert_eq!(response.prediction.label, "Brain");
        assert_eq!(response.prediction.class_id, 1);
    }

    #[tokio::test]
    async fn test_predict_accepts_multipart_file_field() {
        let Json(response) = predict(
            State(loaded_state()),
            multipart_request("file", "image/png", &png_body()),
        )
        .await
        .unwrap();
        assert_eq!(response.prediction.label, "Brain");
        assert!(!response.explanation.heatmap_base64.is_empty());
    }

    #[tokio::test]
    async fn test_multipart_file_must_be_an_image() {
        let err = predict(
            State(loaded_state()),
            multipart_request("file", "text/plain", b"not an image"),
        )
        .await
        .unwrap_err();
        let (status, body) = error_parts(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "File must be an image");
    }

    #[tokio::test]
    async fn test_multipart_without_file_field_is_422() {
        let err = predict(
            State(loaded_state()),
            multipart_request("upload", "image/png", &png_body()),
        )
        .await
        .unwrap_err();
        let (status, body) = error_parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Field 'file' is required");
    }

    #[tokio::test]
    async fn test_predict_rejects_non_image_content_type() {
        let err = predict(
            State(loaded_state()),
            raw_request(Some("application/json"), png_body()),
        )
        .await
        .unwrap_err();
        let (status, body) = error_parts(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "File must be an image");

        let missing = predict(State(loaded_state()), raw_request(None, png_body()))
            .await
            .unwrap_err();
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_predict_rejects_empty_and_undecodable_bodies() {
        let empty = predict(
            State(loaded_state()),
            raw_request(Some("image/png"), Vec::new()),
        )
        .await
        .unwrap_err();
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);

        let garbage = predict(
            State(loaded_state()),
            raw_request(
                Some("image/jpeg"),
                b"plain text pretending to be a jpeg".to_vec(),
            ),
        )
        .await
        .unwrap_err();
        assert_eq!(garbage.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_predict_without_model_is_503() {
        let err = predict(
            State(unavailable_state()),
            raw_request(Some("image/png"), png_body()),
        )
        .await
        .unwrap_err();
        let (status, body) = error_parts(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Model is not loaded.");
    }
}
