//! Health check aggregation.
//!
//! Named checks are registered before start, run on a fixed interval by a
//! background ticker, and folded into one report served at `/health`.

mod check;
mod store;
mod version;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use check::HealthCheck;
pub use store::{STORE_CHECK_NAME, StoreChecker};
pub use version::{BuildInfo, VersionInfo};

/// Errors raised by the health aggregator.
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("health check '{0}' is already registered")]
    DuplicateCheck(String),

    #[error("health check name must not be empty")]
    EmptyName,

    #[error("health check interval must be non-zero")]
    ZeroInterval,
}

/// Health of a single check or of the whole service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Warning,
    Critical,
}

impl Status {
    /// Status code the `/health` endpoint answers with.
    pub fn http_status(self) -> StatusCode {
        match self {
            Status::Ok => StatusCode::OK,
            Status::Warning => StatusCode::TOO_MANY_REQUESTS,
            Status::Critical => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Outcome of one run of a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub status: Status,
    pub message: String,
}

impl CheckResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: Status::Warning,
            message: message.into(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            status: Status::Critical,
            message: message.into(),
        }
    }
}

/// Last known state of a registered check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckState {
    pub name: String,
    /// `None` until the check has run once.
    pub status: Option<Status>,
    pub message: String,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
}

impl CheckState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: None,
            message: String::new(),
            last_checked: None,
            last_success: None,
            last_failure: None,
        }
    }

    /// Records the outcome of a run at `at`.
    pub fn record(&mut self, result: CheckResult, at: DateTime<Utc>) {
        self.last_checked = Some(at);
        if result.status == Status::Ok {
            self.last_success = Some(at);
        } else {
            self.last_failure = Some(at);
        }
        self.status = Some(result.status);
        self.message = result.message;
    }

    /// Unchecked counts as failing.
    pub fn is_failing(&self) -> bool {
        self.status != Some(Status::Ok)
    }
}

/// Aggregate health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: Status,
    pub version: VersionInfo,
    pub start_time: DateTime<Utc>,
    /// Milliseconds since start.
    pub uptime: i64,
    pub checks: Vec<CheckState>,
}

/// A single health probe, e.g. a database ping.
#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self) -> CheckResult;
}

/// The aggregator the service registers checks with and starts and stops.
///
/// # Implementors
///
/// - `HealthCheck` - Interval ticker with a critical timeout
pub trait HealthChecker: Send + Sync {
    /// Registers a named check. Names must be unique.
    fn add_check(&self, name: &str, checker: Arc<dyn Checker>) -> Result<(), HealthError>;

    /// Starts periodic checking. Calling it again has no effect.
    fn start(&self);

    /// Stops periodic checking. Calling it again has no effect.
    fn stop(&self);

    /// Current aggregate report.
    fn report(&self) -> HealthReport;
}
