//! Service lifecycle.
//!
//! A [`Service`] moves through
//! `Uninitialized → Initializing → Ready → Running → ShuttingDown → Closed`,
//! landing in `Failed` when initialization or teardown goes wrong.
//! Teardown stops health checking, then drains the HTTP server, then closes
//! the data store, all against the graceful shutdown deadline.

mod initialiser;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cachetime_store::{DataStore, StoreError};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{error, info, warn};

use crate::auth::{IdentityError, WriteAccess};
use crate::config::{Config, ConfigError};
use crate::health::{BuildInfo, HealthChecker, HealthError, STORE_CHECK_NAME, StoreChecker};
use crate::server::{HttpServer, ServerError, create_router};
use crate::state::AppState;

pub use initialiser::{ExternalServiceList, Initialiser};

/// Lifecycle state of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Uninitialized,
    Initializing,
    /// Wired but not yet serving.
    Ready,
    Running,
    ShuttingDown,
    Closed,
    Failed,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::ShuttingDown => "shutting down",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A teardown step that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownStep {
    ShutdownHttpServer,
    CloseDataStore,
    /// The teardown task itself panicked.
    Teardown,
}

impl fmt::Display for ShutdownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ShutdownHttpServer => "shutdown http server",
            Self::CloseDataStore => "close data store",
            Self::Teardown => "teardown",
        };
        f.write_str(name)
    }
}

/// A teardown step that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: ShutdownStep,
    pub reason: String,
}

/// Errors raised by the service lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialise data store: {0}")]
    DataStore(#[source] StoreError),

    #[error("could not instantiate healthcheck: {0}")]
    HealthCheck(#[source] HealthError),

    #[error("unable to register checkers: {0}")]
    RegisterCheckers(#[source] HealthError),

    #[error("failed to initialise identity verifier: {0}")]
    Identity(#[source] IdentityError),

    #[error("failure in HTTP listen and serve: {0}")]
    Listen(#[source] ServerError),

    #[error("cannot {operation} a service that is {state}")]
    InvalidState {
        operation: &'static str,
        state: ServiceState,
    },

    #[error("shutdown deadline of {0:?} exceeded")]
    ShutdownTimedOut(Duration),

    #[error("failed to shutdown gracefully")]
    ShutdownFailed(Vec<StepFailure>),
}

/// Outcome of the teardown task.
#[derive(Debug, Default)]
struct Teardown {
    failures: Vec<StepFailure>,
    deadline_exceeded: bool,
}

/// Owns the wired components and drives their lifecycle.
pub struct Service {
    config: Config,
    state: ServiceState,
    data_store: Option<Arc<dyn DataStore>>,
    health_check: Option<Arc<dyn HealthChecker>>,
    server: Option<Arc<dyn HttpServer>>,
}

impl Service {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: ServiceState::Uninitialized,
            data_store: None,
            health_check: None,
            server: None,
        }
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connects and wires every component.
    ///
    /// The first failure aborts initialization; anything already opened is
    /// closed again and the service is left `Failed`.
    pub async fn initialize(
        &mut self,
        initialiser: &dyn Initialiser,
        build_info: BuildInfo,
    ) -> Result<(), ServiceError> {
        self.expect_state("initialize", &[ServiceState::Uninitialized])?;
        self.state = ServiceState::Initializing;

        info!(config = ?self.config, "Initializing service");

        let data_store = match initialiser.get_data_store(&self.config.mongodb).await {
            Ok(store) => store,
            Err(e) => {
                error!(error = %e, "Failed to initialise data store");
                self.state = ServiceState::Failed;
                return Err(ServiceError::DataStore(e));
            },
        };

        match self.wire(initialiser, build_info, Arc::clone(&data_store)) {
            Ok((health_check, server)) => {
                self.data_store = Some(data_store);
                self.health_check = Some(health_check);
                self.server = Some(server);
                self.state = ServiceState::Ready;
                info!("Service ready");
                Ok(())
            },
            Err(e) => {
                error!(error = %e, "Failed to initialise service");
                if let Err(close_err) = data_store.close().await {
                    warn!(error = %close_err, "Failed to close data store after failed initialization");
                }
                self.state = ServiceState::Failed;
                Err(e)
            },
        }
    }

    fn wire(
        &self,
        initialiser: &dyn Initialiser,
        build_info: BuildInfo,
        data_store: Arc<dyn DataStore>,
    ) -> Result<(Arc<dyn HealthChecker>, Arc<dyn HttpServer>), ServiceError> {
        let health_check = initialiser
            .get_health_check(&self.config, build_info)
            .map_err(ServiceError::HealthCheck)?;

        health_check
            .add_check(
                STORE_CHECK_NAME,
                Arc::new(StoreChecker::new(Arc::clone(&data_store))),
            )
            .map_err(ServiceError::RegisterCheckers)?;

        let verifier = if self.config.is_publishing {
            Some(
                initialiser
                    .get_identity_verifier(&self.config.zebedee_url)
                    .map_err(ServiceError::Identity)?,
            )
        } else {
            None
        };

        let write_access = WriteAccess::for_deployment(
            self.config.is_publishing,
            self.config.enable_web_writes,
            verifier,
        )
        .map_err(ServiceError::Identity)?;
        info!(write_access = ?write_access, "Write route configured");

        let router = create_router(
            AppState::new(data_store),
            Arc::clone(&health_check),
            write_access,
            initialiser.get_metrics_handle(),
        );

        let addr = self.config.socket_addr()?;
        let server = initialiser.get_http_server(addr, router);

        Ok((health_check, server))
    }

    /// Starts health checking and spawns the HTTP listener.
    ///
    /// A listener failure is sent on `errors`; only the first one is kept if
    /// the channel is full.
    pub fn run(&mut self, errors: mpsc::Sender<ServiceError>) -> Result<(), ServiceError> {
        self.expect_state("run", &[ServiceState::Ready])?;

        let (Some(health_check), Some(server)) = (&self.health_check, &self.server) else {
            return Err(ServiceError::InvalidState {
                operation: "run",
                state: self.state,
            });
        };

        health_check.start();

        let server = Arc::clone(server);
        tokio::spawn(async move {
            if let Err(e) = server.listen_and_serve().await {
                error!(error = %e, "HTTP server failed");
                let _ = errors.try_send(ServiceError::Listen(e));
            }
        });

        self.state = ServiceState::Running;
        info!(bind_addr = %self.config.bind_addr, "Service running");
        Ok(())
    }

    /// Tears the service down in order within the graceful shutdown timeout.
    ///
    /// Every step runs even if an earlier one failed.
    pub async fn close(&mut self) -> Result<(), ServiceError> {
        self.expect_state("close", &[ServiceState::Ready, ServiceState::Running])?;
        self.state = ServiceState::ShuttingDown;

        let timeout = self.config.graceful_shutdown_timeout;
        let deadline = Instant::now() + timeout;
        info!(graceful_shutdown_timeout = ?timeout, "Commencing graceful shutdown");

        let teardown = tokio::spawn(teardown(
            self.health_check.clone(),
            self.server.clone(),
            self.data_store.clone(),
            deadline,
        ));

        let outcome = match timeout_at(deadline, teardown).await {
            Err(_) => Teardown {
                failures: Vec::new(),
                deadline_exceeded: true,
            },
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => Teardown {
                failures: vec![StepFailure {
                    step: ShutdownStep::Teardown,
                    reason: join_err.to_string(),
                }],
                deadline_exceeded: false,
            },
        };

        if outcome.deadline_exceeded {
            error!(timeout = ?timeout, "Shutdown timed out");
            self.state = ServiceState::Failed;
            return Err(ServiceError::ShutdownTimedOut(timeout));
        }

        if !outcome.failures.is_empty() {
            error!(failures = ?outcome.failures, "Failed to shutdown gracefully");
            self.state = ServiceState::Failed;
            return Err(ServiceError::ShutdownFailed(outcome.failures));
        }

        self.state = ServiceState::Closed;
        info!("Graceful shutdown was successful");
        Ok(())
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[ServiceState],
    ) -> Result<(), ServiceError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ServiceError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

async fn teardown(
    health_check: Option<Arc<dyn HealthChecker>>,
    server: Option<Arc<dyn HttpServer>>,
    data_store: Option<Arc<dyn DataStore>>,
    deadline: Instant,
) -> Teardown {
    let mut outcome = Teardown::default();

    // health checks depend on everything else
    if let Some(health_check) = health_check {
        health_check.stop();
    }

    // stop incoming requests before closing outbound connections
    if let Some(server) = server {
        match timeout_at(deadline, server.shutdown()).await {
            Ok(Ok(())) => {},
            Ok(Err(e)) => {
                error!(error = %e, "Failed to shutdown http server");
                outcome.failures.push(StepFailure {
                    step: ShutdownStep::ShutdownHttpServer,
                    reason: e.to_string(),
                });
            },
            Err(_) => {
                error!("HTTP server did not drain before the deadline");
                outcome.deadline_exceeded = true;
                outcome.failures.push(StepFailure {
                    step: ShutdownStep::ShutdownHttpServer,
                    reason: "deadline exceeded".to_string(),
                });
            },
        }
    }

    if let Some(data_store) = data_store {
        if let Err(e) = data_store.close().await {
            error!(error = %e, store = data_store.name(), "Failed to close data store");
            outcome.failures.push(StepFailure {
                step: ShutdownStep::CloseDataStore,
                reason: e.to_string(),
            });
        }
    }

    outcome
}
