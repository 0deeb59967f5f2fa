//! # Cache Time Server
//!
//! HTTP API and service lifecycle for the cache time registry.
//!
//! ## Endpoints
//!
//! - `GET /v1/cache-times/{id}` - fetch one cache time
//! - `PUT /v1/cache-times/{id}` - create or replace one cache time
//! - `GET /v1/cache-times` - list cache times, paginated and filterable by
//!   release time
//! - `GET /health` - aggregate health report
//! - `GET /metrics` - Prometheus exposition

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod service;
pub mod state;

pub use auth::{Identity, IdentityVerifier, WriteAccess, ZebedeeClient};
pub use config::{Config, ConfigError};
pub use error::{AppError, ErrorResponse};
pub use health::{BuildInfo, HealthCheck, HealthChecker, HealthReport, Status};
pub use server::{AxumServer, HttpServer, ServerError, create_router, shutdown_signal};
pub use service::{ExternalServiceList, Initialiser, Service, ServiceError, ServiceState};
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }
}
