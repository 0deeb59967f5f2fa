//! Cache Time Core - Domain types and validation
//!
//! This crate provides the foundational types for the cache time registry:
//! the [`CacheTime`] record, pagination requests, the release-time window and
//! the validators used by the HTTP layer before anything reaches a store.

pub mod body;
pub mod model;
pub mod query;
pub mod validation;

pub use body::{BodyError, CacheTimeBody, decode_body};
pub use model::{CacheTime, CacheTimesList};
pub use query::{
    DEFAULT_LIMIT, DEFAULT_OFFSET, Page, PageRequest, RELEASE_TIME_TOLERANCE, ReleaseWindow,
};
pub use validation::{ValidationError, find_id_errors, validate_cache_time, validate_id};

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

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
