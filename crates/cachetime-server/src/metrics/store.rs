//! Data store metrics recording.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use cachetime_core::{CacheTime, Page, PageRequest};
use cachetime_store::{DataStore, StoreError};
use metrics::{counter, histogram};

pub const STORE_OPERATIONS_TOTAL: &str = "cachetime_store_operations_total";
pub const STORE_OPERATION_DURATION: &str = "cachetime_store_operation_seconds";

/// Registra las metricas del store.
pub fn register_store_metrics() {
    metrics::describe_counter!(
        STORE_OPERATIONS_TOTAL,
        "Total number of data store operations by outcome"
    );
    metrics::describe_histogram!(
        STORE_OPERATION_DURATION,
        "Time spent on data store operations"
    );
}

fn outcome<T>(result: &Result<T, StoreError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) if e.is_not_found() => "not_found",
        Err(_) => "error",
    }
}

fn record<T>(operation: &'static str, start: Instant, result: &Result<T, StoreError>) {
    let outcome = outcome(result);

    counter!(STORE_OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome).increment(1);
    histogram!(STORE_OPERATION_DURATION, "operation" => operation, "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Decorator that times every call to the wrapped store.
pub struct InstrumentedStore {
    inner: Arc<dyn DataStore>,
}

impl InstrumentedStore {
    pub fn new(inner: Arc<dyn DataStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DataStore for InstrumentedStore {
    async fn get_cache_time(&self, id: &str) -> Result<CacheTime, StoreError> {
        let start = Instant::now();
        let result = self.inner.get_cache_time(id).await;
        record("get_cache_time", start, &result);
        result
    }

    async fn get_cache_times(&self, request: &PageRequest) -> Result<Page<CacheTime>, StoreError> {
        let start = Instant::now();
        let result = self.inner.get_cache_times(request).await;
        record("get_cache_times", start, &result);
        result
    }

    async fn upsert_cache_time(&self, cache_time: &CacheTime) -> Result<(), StoreError> {
        let start = Instant::now();
        let result = self.inner.upsert_cache_time(cache_time).await;
        record("upsert_cache_time", start, &result);
        result
    }

    async fn check_health(&self) -> Result<(), StoreError> {
        let start = Instant::now();
        let result = self.inner.check_health().await;
        record("check_health", start, &result);
        result
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.inner.close().await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachetime_store::MemoryStore;

    #[tokio::test]
    async fn delegates_to_inner_store() {
        let inner = Arc::new(MemoryStore::new());
        let store = InstrumentedStore::new(inner.clone());
        let record = CacheTime::for_path("/a");

        store.upsert_cache_time(&record).await.unwrap();

        assert_eq!(inner.len(), 1);
        assert_eq!(store.get_cache_time(&record.id).await.unwrap(), record);
        assert!(store.get_cache_time("missing").await.unwrap_err().is_not_found());
        assert_eq!(store.name(), inner.name());

        store.close().await.unwrap();
        assert!(inner.is_closed());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(outcome::<()>(&Ok(())), "ok");
        assert_eq!(outcome::<()>(&Err(StoreError::not_found("x"))), "not_found");
        assert_eq!(outcome::<()>(&Err(StoreError::Closed)), "error");
    }
}
