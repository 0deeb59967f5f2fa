//! Error types for cache time stores.

use std::time::Duration;

/// Errors that can occur when reading or writing cache times.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record exists for the requested id.
    #[error("cachetime not found")]
    NotFound { id: String },

    /// The backing database could not be reached.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The database rejected or failed an operation.
    #[error("{operation} failed: {reason}")]
    Query {
        operation: &'static str,
        reason: String,
    },

    /// An operation did not finish within the query timeout.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// The store was used after `close`.
    #[error("store is closed")]
    Closed,

    /// The store configuration is unusable.
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Creates a not found error for an id.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new query error.
    pub fn query(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Query {
            operation,
            reason: reason.into(),
        }
    }

    /// Returns true if the record simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}
