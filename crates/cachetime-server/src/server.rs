use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    handler::Handler,
    middleware,
    routing::{MethodRouter, get},
};
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::auth::{WriteAccess, require_identity};
use crate::handlers::{
    cache_times::{create_or_update_cache_time, get_cache_time, get_cache_times},
    health::health_check,
    metrics::metrics_handler,
};
use crate::health::HealthChecker;
use crate::metrics::http::http_metrics_middleware;
use crate::middleware::{log_requests, request_id};
use crate::state::AppState;

/// Errors raised by the HTTP listener.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("server is already running")]
    AlreadyRunning,
}

/// Builds the router.
///
/// The write route is shaped by `write_access`; `/metrics` is only mounted
/// when a Prometheus handle is given.
pub fn create_router(
    state: AppState,
    health: Arc<dyn HealthChecker>,
    write_access: WriteAccess,
    prometheus_handle: Option<PrometheusHandle>,
) -> Router {
    let item_route: MethodRouter<AppState> = match write_access {
        WriteAccess::Disabled => get(get_cache_time),
        WriteAccess::Open => get(get_cache_time).put(create_or_update_cache_time),
        WriteAccess::Authenticated(verifier) => get(get_cache_time).put(
            create_or_update_cache_time
                .layer(middleware::from_fn_with_state(verifier, require_identity)),
        ),
    };

    let api_router = Router::new()
        .route("/v1/cache-times", get(get_cache_times))
        .route("/v1/cache-times/{id}", item_route)
        .with_state(state);

    let health_router = Router::new()
        .route("/health", get(health_check))
        .with_state(health);

    let mut router = Router::new().merge(api_router).merge(health_router);

    if let Some(handle) = prometheus_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics_handler))
                .with_state(handle),
        );
    }

    // Last layer added runs first.
    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(log_requests))
        .layer(middleware::from_fn(request_id))
}

/// An HTTP listener the service can run and stop.
///
/// # Implementors
///
/// - `AxumServer` - Serves a router on a TCP socket
#[async_trait]
pub trait HttpServer: Send + Sync {
    /// Binds and serves until shut down. Returns early if binding or serving
    /// fails.
    async fn listen_and_serve(&self) -> Result<(), ServerError>;

    /// Stops accepting connections and waits for in-flight requests.
    async fn shutdown(&self) -> Result<(), ServerError>;
}

/// Serves a router with graceful shutdown.
pub struct AxumServer {
    addr: SocketAddr,
    router: Mutex<Option<Router>>,
    local_addr: Mutex<Option<SocketAddr>>,
    started: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    finished_tx: watch::Sender<bool>,
}

impl AxumServer {
    pub fn new(addr: SocketAddr, router: Router) -> Self {
        Self {
            addr,
            router: Mutex::new(Some(router)),
            local_addr: Mutex::new(None),
            started: AtomicBool::new(false),
            shutdown_tx: watch::Sender::new(false),
            finished_tx: watch::Sender::new(false),
        }
    }

    /// Address actually bound, once listening. Differs from the configured
    /// one when port 0 was requested.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }
}

#[async_trait]
impl HttpServer for AxumServer {
    async fn listen_and_serve(&self) -> Result<(), ServerError> {
        let router = self.router.lock().take().ok_or(ServerError::AlreadyRunning)?;
        self.started.store(true, Ordering::SeqCst);

        let result = async {
            let listener = tokio::net::TcpListener::bind(self.addr)
                .await
                .map_err(|source| ServerError::Bind {
                    addr: self.addr,
                    source,
                })?;

            let bound = listener.local_addr()?;
            *self.local_addr.lock() = Some(bound);
            tracing::info!(addr = %bound, "Server listening");

            let mut shutdown_rx = self.shutdown_tx.subscribe();
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.wait_for(|stop| *stop).await;
                })
                .await?;

            Ok::<(), ServerError>(())
        }
        .await;

        self.finished_tx.send_replace(true);
        result
    }

    async fn shutdown(&self) -> Result<(), ServerError> {
        self.shutdown_tx.send_replace(true);

        if !self.started.load(Ordering::SeqCst) {
            return Ok(());
        }

        let mut finished_rx = self.finished_tx.subscribe();
        let _ = finished_rx.wait_for(|done| *done).await;

        tracing::info!("Server drained");
        Ok(())
    }
}

/// Completes on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
