//! Cache time records.

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// Invalidation metadata for a single site path.
///
/// The `id` is the MD5 digest of the path, hex encoded. A record is created or
/// overwritten only by an upsert, so the same `id` always maps to one path.
///
/// # Example
///
/// ```
/// use cachetime_core::CacheTime;
///
/// let record = CacheTime::for_path("/economy/gdp");
/// assert_eq!(record.id.len(), 32);
/// assert_eq!(record.path, "/economy/gdp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTime {
    /// Lowercase hex MD5 of the path.
    #[serde(rename = "_id")]
    pub id: String,

    /// Path for which caching is set.
    pub path: String,

    /// Publishing collection the record belongs to, used for grouping and filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,

    /// Scheduled release of the content behind the path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_time: Option<DateTime<Utc>>,

    /// Optional validation token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl CacheTime {
    /// Creates a record with only `id` and `path` set.
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            collection_id: None,
            release_time: None,
            etag: None,
        }
    }

    /// Creates a record whose id is derived from the path.
    pub fn for_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(Self::id_for_path(&path), path)
    }

    /// Computes the canonical id of a path.
    pub fn id_for_path(path: &str) -> String {
        hex::encode(Md5::digest(path.as_bytes()))
    }

    pub fn with_collection_id(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub fn with_release_time(mut self, release_time: DateTime<Utc>) -> Self {
        self.release_time = Some(release_time);
        self
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }
}

/// One page of cache times plus the pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTimesList {
    pub items: Vec<CacheTime>,
    pub count: usize,
    pub limit: usize,
    pub offset: usize,
    pub total_count: usize,
}

impl CacheTimesList {
    /// Builds the list response; `count` is taken from the page itself.
    pub fn new(items: Vec<CacheTime>, limit: usize, offset: usize, total_count: usize) -> Self {
        Self {
            count: items.len(),
            items,
            limit,
            offset,
            total_count,
        }
    }
}
