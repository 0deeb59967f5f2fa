//! HTTP metrics middleware.

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};

pub const HTTP_REQUESTS_TOTAL: &str = "cachetime_http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "cachetime_http_request_duration_seconds";

/// Records a counter and a duration histogram for each request.
///
/// Paths are labelled by route template, so `/v1/cache-times/{id}` is one
/// series regardless of the id.
pub async fn http_metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();

    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        HTTP_REQUEST_DURATION,
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());

    response
}

pub fn register_http_metrics() {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
    metrics::describe_histogram!(HTTP_REQUEST_DURATION, "HTTP request duration in seconds");
}
