//! Metrics recorder installation.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

use super::{http, store};

/// Histogram buckets in seconds, from 100µs to 10s.
const DURATION_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Installs the global Prometheus recorder and returns the handle the
/// `/metrics` endpoint renders from.
///
/// Fails if a recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets(DURATION_BUCKETS)?
        .install_recorder()?;

    http::register_http_metrics();
    store::register_store_metrics();

    info!("Metrics system initialized");
    Ok(handle)
}
