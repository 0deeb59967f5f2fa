//! In-process cache time store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use cachetime_core::{CacheTime, Page, PageRequest};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::store::DataStore;

/// A [`DataStore`] backed by an ordered map.
///
/// Records are keyed by id, so iteration order is already the ascending id
/// order the port promises. Every call after [`DataStore::close`] fails with
/// [`StoreError::Closed`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, CacheTime>>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with records.
    pub fn with_records(records: impl IntoIterator<Item = CacheTime>) -> Self {
        let store = Self::new();
        {
            let mut map = store.records.write();
            for record in records {
                map.insert(record.id.clone(), record);
            }
        }
        store
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get_cache_time(&self, id: &str) -> Result<CacheTime, StoreError> {
        self.ensure_open()?;

        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn get_cache_times(&self, request: &PageRequest) -> Result<Page<CacheTime>, StoreError> {
        self.ensure_open()?;

        let window = request.release_window();
        let records = self.records.read();

        let matching: Vec<&CacheTime> = records
            .values()
            .filter(|record| match (window, record.release_time) {
                (None, _) => true,
                (Some(window), Some(release_time)) => window.contains(release_time),
                (Some(_), None) => false,
            })
            .collect();

        let total_count = matching.len();
        let items = matching
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect();

        Ok(Page::new(items, total_count))
    }

    async fn upsert_cache_time(&self, cache_time: &CacheTime) -> Result<(), StoreError> {
        self.ensure_open()?;

        let previous = self
            .records
            .write()
            .insert(cache_time.id.clone(), cache_time.clone());

        debug!(
            id = %cache_time.id,
            replaced = previous.is_some(),
            "Cache time upserted"
        );
        Ok(())
    }

    async fn check_health(&self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
