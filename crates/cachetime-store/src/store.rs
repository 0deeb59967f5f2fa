//! Data store trait definition.

use async_trait::async_trait;
use cachetime_core::{CacheTime, Page, PageRequest};

use crate::error::StoreError;

/// Persistence port for cache time records.
///
/// This trait abstracts over the backing database so the HTTP layer and the
/// service lifecycle never depend on a concrete driver.
///
/// # Implementors
///
/// - `MongoStore` - Stores cache times in a MongoDB collection
/// - `MemoryStore` - Keeps cache times in process, used by tests
///
/// Implementations must be safe to call concurrently. Concurrent upserts of
/// the same id resolve last-write-wins.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetches one cache time by id.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no record has this id
    /// - any other variant if the database could not answer
    async fn get_cache_time(&self, id: &str) -> Result<CacheTime, StoreError>;

    /// Fetches a page of cache times ordered ascending by id.
    ///
    /// When the request carries a release time, only records whose release
    /// time lies inside the request's release window match. The returned
    /// `total_count` counts every match, not just the page.
    async fn get_cache_times(&self, request: &PageRequest) -> Result<Page<CacheTime>, StoreError>;

    /// Inserts the record, or replaces the whole record stored under its id.
    async fn upsert_cache_time(&self, cache_time: &CacheTime) -> Result<(), StoreError>;

    /// Lightweight reachability probe used by the health checker.
    async fn check_health(&self) -> Result<(), StoreError>;

    /// Closes the connection to the database.
    async fn close(&self) -> Result<(), StoreError>;

    /// Returns the name of this store, used for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStore {
        record: CacheTime,
    }

    #[async_trait]
    impl DataStore for FixedStore {
        async fn get_cache_time(&self, id: &str) -> Result<CacheTime, StoreError> {
            if id == self.record.id {
                Ok(self.record.clone())
            } else {
                Err(StoreError::not_found(id))
            }
        }

        async fn get_cache_times(
            &self,
            _request: &PageRequest,
        ) -> Result<Page<CacheTime>, StoreError> {
            Ok(Page::new(vec![self.record.clone()], 1))
        }

        async fn upsert_cache_time(&self, _cache_time: &CacheTime) -> Result<(), StoreError> {
            Ok(())
        }

        async fn check_health(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn close(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let store: Box<dyn DataStore> = Box::new(FixedStore {
            record: CacheTime::for_path("/a"),
        });

        let id = CacheTime::id_for_path("/a");
        assert_eq!(store.get_cache_time(&id).await.unwrap().path, "/a");
        assert!(store.get_cache_time("other").await.unwrap_err().is_not_found());
        assert_eq!(store.name(), "fixed");
    }
}
