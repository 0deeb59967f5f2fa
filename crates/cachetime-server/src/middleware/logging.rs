//! Structured request logging.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{Instrument, info, info_span, warn};

use super::request_id::RequestId;

/// Wraps each request in an `http_request` span and logs its outcome.
///
/// Must run inside [`request_id`](super::request_id) so the id is set.
pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        info!("Request started");

        let response = next.run(request).await;
        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;

        if status.is_server_error() {
            warn!(status = status.as_u16(), duration_ms, "Request failed");
        } else {
            info!(status = status.as_u16(), duration_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}
