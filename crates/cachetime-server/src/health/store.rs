use std::sync::Arc;

use async_trait::async_trait;
use cachetime_store::DataStore;

use super::{CheckResult, Checker};

/// Name the data store check is registered under.
pub const STORE_CHECK_NAME: &str = "Mongo DB";

/// Pings the data store.
pub struct StoreChecker {
    store: Arc<dyn DataStore>,
}

impl StoreChecker {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Checker for StoreChecker {
    async fn check(&self) -> CheckResult {
        match self.store.check_health().await {
            Ok(()) => CheckResult::ok(format!("{} is OK", self.store.name())),
            Err(e) => {
                tracing::warn!(store = self.store.name(), error = %e, "Data store health check failed");
                CheckResult::critical(e.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Status;
    use cachetime_store::MemoryStore;

    #[tokio::test]
    async fn reachable_store_is_ok() {
        let checker = StoreChecker::new(Arc::new(MemoryStore::new()));
        assert_eq!(checker.check().await.status, Status::Ok);
    }

    #[tokio::test]
    async fn closed_store_is_critical() {
        let store = Arc::new(MemoryStore::new());
        store.close().await.unwrap();

        let checker = StoreChecker::new(store);
        assert_eq!(checker.check().await.status, Status::Critical);
    }
}
