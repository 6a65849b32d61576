//! Request-scoped middleware.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags each request with a fresh UUID v4.
///
/// The id is recorded on a tracing span wrapping the rest of the stack and
/// returned in the `X-Request-ID` response header.
pub async fn request_id(req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    let span = info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let mut response = next.run(req).await;
        info!(status = response.status().as_u16(), "request finished");
        if let Ok(value) = HeaderValue::from_str(&id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Builds the CORS layer for the configured origins.
///
/// A `"*"` entry allows any origin without credentials. Otherwise only the
/// listed origins are allowed and credentials are permitted; entries that are
/// not valid header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
