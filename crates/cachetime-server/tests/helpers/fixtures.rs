//! Routers and collaborators wired for tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use cachetime_core::{CacheTime, Page, PageRequest};
use cachetime_server::auth::{CallerToken, Identity, IdentityError, IdentityVerifier, WriteAccess};
use cachetime_server::{AppState, BuildInfo, HealthCheck, HealthChecker, create_router};
use cachetime_store::{DataStore, MemoryStore, StoreError};

use super::client::TestClient;

pub const VALID_TOKEN: &str = "valid-token";

/// Accepts exactly [`VALID_TOKEN`].
pub struct FakeVerifier;

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, token: &CallerToken) -> Result<Identity, IdentityError> {
        if token.value() == VALID_TOKEN {
            Ok(Identity::new("publisher@example.com"))
        } else {
            Err(IdentityError::Rejected("401 Unauthorized".into()))
        }
    }
}

/// Identity provider that cannot be reached.
pub struct UnreachableVerifier;

#[async_trait]
impl IdentityVerifier for UnreachableVerifier {
    async fn verify(&self, _token: &CallerToken) -> Result<Identity, IdentityError> {
        Err(IdentityError::Unavailable("connection refused".into()))
    }
}

/// Store whose every call fails.
pub struct BrokenStore;

#[async_trait]
impl DataStore for BrokenStore {
    async fn get_cache_time(&self, _id: &str) -> Result<CacheTime, StoreError> {
        Err(StoreError::unavailable("connection reset by mongo-secret-host"))
    }

    async fn get_cache_times(&self, _request: &PageRequest) -> Result<Page<CacheTime>, StoreError> {
        Err(StoreError::unavailable("connection reset by mongo-secret-host"))
    }

    async fn upsert_cache_time(&self, _cache_time: &CacheTime) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection reset by mongo-secret-host"))
    }

    async fn check_health(&self) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection reset by mongo-secret-host"))
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "broken"
    }
}

pub fn health_check() -> Arc<dyn HealthChecker> {
    Arc::new(
        HealthCheck::new(
            BuildInfo::from_build_env().into(),
            Duration::from_secs(30),
            Duration::from_secs(90),
        )
        .unwrap(),
    )
}

pub fn router(store: Arc<dyn DataStore>, write_access: WriteAccess) -> Router {
    create_router(AppState::new(store), health_check(), write_access, None)
}

/// Client over a memory store with open writes.
pub fn open_client(store: Arc<MemoryStore>) -> TestClient {
    TestClient::new(router(store, WriteAccess::Open))
}

/// Client over a memory store in publishing mode.
pub fn publishing_client(store: Arc<MemoryStore>) -> TestClient {
    TestClient::new(router(store, WriteAccess::Authenticated(Arc::new(FakeVerifier))))
}

/// Client with the write route disabled.
pub fn read_only_client(store: Arc<MemoryStore>) -> TestClient {
    TestClient::new(router(store, WriteAccess::Disabled))
}

/// Client whose store always fails.
pub fn broken_client() -> TestClient {
    TestClient::new(router(Arc::new(BrokenStore), WriteAccess::Open))
}

/// Client over an empty memory store with open writes.
pub fn client() -> TestClient {
    open_client(Arc::new(MemoryStore::new()))
}
