//! Construction of the service's external dependencies.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use cachetime_store::{DataStore, MongoConfig, MongoStore, StoreError};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::auth::{IdentityError, IdentityVerifier, ZebedeeClient};
use crate::config::Config;
use crate::health::{BuildInfo, HealthCheck, HealthChecker, HealthError};
use crate::metrics::InstrumentedStore;
use crate::server::{AxumServer, HttpServer};

/// Builds the dependencies the service wires together.
///
/// Production uses [`ExternalServiceList`]; tests substitute their own to
/// inject failures and observe teardown.
#[async_trait]
pub trait Initialiser: Send + Sync {
    /// Connects to the data store.
    async fn get_data_store(&self, config: &MongoConfig) -> Result<Arc<dyn DataStore>, StoreError>;

    /// Builds the health aggregator.
    fn get_health_check(
        &self,
        config: &Config,
        build_info: BuildInfo,
    ) -> Result<Arc<dyn HealthChecker>, HealthError>;

    /// Builds the caller identity verifier. Only asked for in publishing mode.
    fn get_identity_verifier(
        &self,
        zebedee_url: &str,
    ) -> Result<Arc<dyn IdentityVerifier>, IdentityError>;

    /// Builds the HTTP listener for the router.
    fn get_http_server(&self, addr: SocketAddr, router: Router) -> Arc<dyn HttpServer>;

    /// Prometheus handle to mount at `/metrics`, if any.
    fn get_metrics_handle(&self) -> Option<PrometheusHandle> {
        None
    }
}

/// Production dependencies: MongoDB, interval health checks, Zebedee and axum.
#[derive(Default)]
pub struct ExternalServiceList {
    metrics_handle: Option<PrometheusHandle>,
}

impl ExternalServiceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}

#[async_trait]
impl Initialiser for ExternalServiceList {
    async fn get_data_store(&self, config: &MongoConfig) -> Result<Arc<dyn DataStore>, StoreError> {
        let store = MongoStore::connect(config).await?;
        Ok(Arc::new(InstrumentedStore::new(Arc::new(store))))
    }

    fn get_health_check(
        &self,
        config: &Config,
        build_info: BuildInfo,
    ) -> Result<Arc<dyn HealthChecker>, HealthError> {
        let health = HealthCheck::new(
            build_info.into(),
            config.health_check_interval,
            config.health_check_critical_timeout,
        )?;
        Ok(Arc::new(health))
    }

    fn get_identity_verifier(
        &self,
        zebedee_url: &str,
    ) -> Result<Arc<dyn IdentityVerifier>, IdentityError> {
        Ok(Arc::new(ZebedeeClient::new(zebedee_url)?))
    }

    fn get_http_server(&self, addr: SocketAddr, router: Router) -> Arc<dyn HttpServer> {
        Arc::new(AxumServer::new(addr, router))
    }

    fn get_metrics_handle(&self) -> Option<PrometheusHandle> {
        self.metrics_handle.clone()
    }
}
