//! MongoDB connection configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Configuration for the MongoDB store.
#[derive(Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Host and port of the cluster, without scheme.
    #[serde(default = "default_cluster_endpoint")]
    cluster_endpoint: String,

    /// Username for authentication, empty for none.
    #[serde(default)]
    username: String,

    /// Password for authentication.
    #[serde(default)]
    password: String,

    /// Database holding the cache times collection.
    #[serde(default = "default_database")]
    database: String,

    /// Collection holding the cache times.
    #[serde(default = "default_collection")]
    collection: String,

    /// Replica set name, empty for none.
    #[serde(default)]
    replica_set: String,

    /// Whether reads use majority read concern.
    #[serde(default)]
    is_strong_read_concern_enabled: bool,

    /// Whether writes wait for a majority acknowledgement.
    #[serde(default = "default_true")]
    is_write_concern_majority_enabled: bool,

    /// Timeout for establishing the connection.
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    connect_timeout: Duration,

    /// Timeout applied to every query.
    #[serde(default = "default_query_timeout", with = "humantime_serde")]
    query_timeout: Duration,

    /// Whether to connect over TLS.
    #[serde(default)]
    is_ssl: bool,
}

fn default_cluster_endpoint() -> String {
    "localhost:27017".to_string()
}

fn default_database() -> String {
    "cache".to_string()
}

fn default_collection() -> String {
    "cachetimes".to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_query_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_true() -> bool {
    true
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            cluster_endpoint: default_cluster_endpoint(),
            username: String::new(),
            password: String::new(),
            database: default_database(),
            collection: default_collection(),
            replica_set: String::new(),
            is_strong_read_concern_enabled: false,
            is_write_concern_majority_enabled: true,
            connect_timeout: default_connect_timeout(),
            query_timeout: default_query_timeout(),
            is_ssl: false,
        }
    }
}

impl MongoConfig {
    pub fn cluster_endpoint(&self) -> &str {
        &self.cluster_endpoint
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the credentials, if a username is configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() {
            None
        } else {
            Some((&self.username, &self.password))
        }
    }

    /// Returns the replica set name, if configured.
    pub fn replica_set(&self) -> Option<&str> {
        if self.replica_set.is_empty() {
            None
        } else {
            Some(&self.replica_set)
        }
    }

    pub fn is_strong_read_concern_enabled(&self) -> bool {
        self.is_strong_read_concern_enabled
    }

    pub fn is_write_concern_majority_enabled(&self) -> bool {
        self.is_write_concern_majority_enabled
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    pub fn is_ssl(&self) -> bool {
        self.is_ssl
    }

    /// Connection string for the driver. Credentials are applied separately.
    pub fn connection_uri(&self) -> String {
        format!("mongodb://{}", self.cluster_endpoint)
    }

    pub fn with_cluster_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.cluster_endpoint = endpoint.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Checks the values that would otherwise fail late, at first use.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.cluster_endpoint.trim().is_empty() {
            return Err(StoreError::InvalidConfig("cluster endpoint is required".into()));
        }
        if self.database.trim().is_empty() {
            return Err(StoreError::InvalidConfig("database is required".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(StoreError::InvalidConfig("collection is required".into()));
        }
        if self.connect_timeout.is_zero() || self.query_timeout.is_zero() {
            return Err(StoreError::InvalidConfig("timeouts must be non-zero".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoConfig")
            .field("cluster_endpoint", &self.cluster_endpoint)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("replica_set", &self.replica_set)
            .field(
                "is_strong_read_concern_enabled",
                &self.is_strong_read_concern_enabled,
            )
            .field(
                "is_write_concern_majority_enabled",
                &self.is_write_concern_majority_enabled,
            )
            .field("connect_timeout", &self.connect_timeout)
            .field("query_timeout", &self.query_timeout)
            .field("is_ssl", &self.is_ssl)
            .finish()
    }
}
