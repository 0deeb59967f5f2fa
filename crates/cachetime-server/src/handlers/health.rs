use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::health::{HealthChecker, HealthReport};

/// GET /health
///
/// Answers 200 for OK, 429 for WARNING and 500 for CRITICAL.
pub async fn health_check(
    State(health): State<Arc<dyn HealthChecker>>,
) -> (StatusCode, Json<HealthReport>) {
    let report = health.report();
    (report.status.http_status(), Json(report))
}
