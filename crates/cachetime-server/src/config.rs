//! Service configuration.
//!
//! Built once at process start from defaults overlaid by environment
//! variables, then handed to the service by value. Nested keys use `__` as
//! separator, e.g. `MONGODB__CLUSTER_ENDPOINT`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use cachetime_store::MongoConfig;
use config::{Environment, Map};
use serde::Deserialize;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the cache time service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the HTTP listener binds to. `:29100` means all interfaces.
    pub bind_addr: String,

    /// Deadline for the whole ordered shutdown.
    #[serde(with = "humantime_serde")]
    pub graceful_shutdown_timeout: Duration,

    /// Interval between health check runs.
    #[serde(rename = "healthcheck_interval", with = "humantime_serde")]
    pub health_check_interval: Duration,

    /// How long a check may fail before the service reports CRITICAL.
    #[serde(rename = "healthcheck_critical_timeout", with = "humantime_serde")]
    pub health_check_critical_timeout: Duration,

    /// Base URL of the identity provider.
    pub zebedee_url: String,

    /// Publishing deployments accept authenticated writes.
    pub is_publishing: bool,

    /// Web deployments only register the write route when this is set.
    pub enable_web_writes: bool,

    /// Document database settings.
    #[serde(default)]
    pub mongodb: MongoConfig,
}

impl Config {
    /// Loads configuration from defaults and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(Environment::default())
    }

    /// Loads configuration from defaults and the given variables only.
    ///
    /// Keys are environment-style names such as `BIND_ADDR`.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let source: Map<String, String> = vars.into_iter().collect();
        Self::build(Environment::default().source(Some(source)))
    }

    fn build(environment: Environment) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("bind_addr", ":29100")?
            .set_default("graceful_shutdown_timeout", "5s")?
            .set_default("healthcheck_interval", "30s")?
            .set_default("healthcheck_critical_timeout", "90s")?
            .set_default("zebedee_url", "http://localhost:8082")?
            .set_default("is_publishing", false)?
            .set_default("enable_web_writes", false)?
            .add_source(environment.separator("__").try_parsing(true))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would otherwise fail late.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.graceful_shutdown_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "graceful shutdown timeout must be non-zero".into(),
            ));
        }
        if self.health_check_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "health check interval must be non-zero".into(),
            ));
        }
        if self.is_publishing && self.zebedee_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "zebedee url is required in publishing mode".into(),
            ));
        }

        self.mongodb
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Resolves the bind address, accepting the `:port` shorthand.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = if self.bind_addr.starts_with(':') {
            format!("0.0.0.0{}", self.bind_addr)
        } else {
            self.bind_addr.clone()
        };

        addr.parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address '{}'", self.bind_addr)))
    }
}
