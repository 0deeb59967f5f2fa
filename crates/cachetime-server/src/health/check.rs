//! Interval-driven health aggregator.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info};

use super::{
    CheckState, Checker, HealthChecker, HealthError, HealthReport, Status, VersionInfo,
};

struct Registered {
    checker: Arc<dyn Checker>,
    state: CheckState,
}

struct Inner {
    version: VersionInfo,
    interval: Duration,
    critical_timeout: TimeDelta,
    checks: RwLock<Vec<Registered>>,
    started_at: RwLock<DateTime<Utc>>,
}

/// Runs registered checks every `interval` and reports CRITICAL once a check
/// has been failing for longer than `critical_timeout`.
pub struct HealthCheck {
    inner: Arc<Inner>,
    /// Present while the ticker runs.
    shutdown_tx: Mutex<Option<watch::Sender<bool>>>,
}

impl HealthCheck {
    pub fn new(
        version: VersionInfo,
        interval: Duration,
        critical_timeout: Duration,
    ) -> Result<Self, HealthError> {
        if interval.is_zero() {
            return Err(HealthError::ZeroInterval);
        }

        Ok(Self {
            inner: Arc::new(Inner {
                version,
                interval,
                critical_timeout: TimeDelta::from_std(critical_timeout)
                    .unwrap_or(TimeDelta::MAX),
                checks: RwLock::new(Vec::new()),
                started_at: RwLock::new(Utc::now()),
            }),
            shutdown_tx: Mutex::new(None),
        })
    }

    /// Runs every check once and records the outcomes.
    pub async fn run_checks(&self) {
        self.inner.run_checks().await;
    }

    /// Returns true while the ticker runs.
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.lock().is_some()
    }

    /// Aggregates the current states as of `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> Status {
        self.inner.status_at(now)
    }
}

impl Inner {
    async fn run_checks(&self) {
        let checkers: Vec<(String, Arc<dyn Checker>)> = self
            .checks
            .read()
            .iter()
            .map(|r| (r.state.name.clone(), Arc::clone(&r.checker)))
            .collect();

        let results = join_all(
            checkers
                .into_iter()
                .map(|(name, checker)| async move { (name, checker.check().await) }),
        )
        .await;
        let now = Utc::now();

        // registrations may have changed while the checks ran
        let mut checks = self.checks.write();
        for (name, result) in results {
            if let Some(registered) = checks.iter_mut().find(|r| r.state.name == name) {
                debug!(check = %name, status = ?result.status, "Health check ran");
                registered.state.record(result, now);
            }
        }
    }

    fn status_at(&self, now: DateTime<Utc>) -> Status {
        let checks = self.checks.read();
        let failing: Vec<&CheckState> = checks
            .iter()
            .map(|r| &r.state)
            .filter(|s| s.is_failing())
            .collect();

        if failing.is_empty() {
            return Status::Ok;
        }

        let started_at = *self.started_at.read();
        if now - started_at <= self.critical_timeout {
            return Status::Warning;
        }

        let timed_out = failing.iter().any(|state| match state.last_success {
            Some(last_success) => now - last_success > self.critical_timeout,
            None => true,
        });

        if timed_out {
            Status::Critical
        } else {
            Status::Warning
        }
    }

    async fn tick(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>) {
        // first tick completes immediately
        let mut ticker = interval(self.interval);

        info!(interval = ?self.interval, "Starting health check ticker");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_checks().await;
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("Health check ticker stopped");
                        break;
                    }
                }
            }
        }
    }
}

impl HealthChecker for HealthCheck {
    fn add_check(&self, name: &str, checker: Arc<dyn Checker>) -> Result<(), HealthError> {
        if name.trim().is_empty() {
            return Err(HealthError::EmptyName);
        }

        let mut checks = self.inner.checks.write();
        if checks.iter().any(|r| r.state.name == name) {
            return Err(HealthError::DuplicateCheck(name.to_string()));
        }

        checks.push(Registered {
            checker,
            state: CheckState::new(name),
        });
        Ok(())
    }

    fn start(&self) {
        let mut shutdown_tx = self.shutdown_tx.lock();
        if shutdown_tx.is_some() {
            return;
        }

        *self.inner.started_at.write() = Utc::now();

        let (tx, rx) = watch::channel(false);
        tokio::spawn(Arc::clone(&self.inner).tick(rx));
        *shutdown_tx = Some(tx);
    }

    fn stop(&self) {
        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(true);
        }
    }

    fn report(&self) -> HealthReport {
        let now = Utc::now();
        let start_time = *self.inner.started_at.read();

        HealthReport {
            status: self.inner.status_at(now),
            version: self.inner.version.clone(),
            start_time,
            uptime: (now - start_time).num_milliseconds(),
            checks: self
                .inner
                .checks
                .read()
                .iter()
                .map(|r| r.state.clone())
                .collect(),
        }
    }
}

impl Drop for HealthCheck {
    fn drop(&mut self) {
        self.stop();
    }
}
