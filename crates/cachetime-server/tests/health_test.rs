//! Tests for the /health endpoint.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use cachetime_server::auth::WriteAccess;
use cachetime_server::health::{STORE_CHECK_NAME, StoreChecker};
use cachetime_server::{AppState, BuildInfo, HealthCheck, HealthChecker, create_router};
use cachetime_store::{DataStore, MemoryStore};
use helpers::{BrokenStore, TestClient, client};
use serde_json::Value;

fn client_with_check(store: Arc<dyn DataStore>, critical_timeout: Duration) -> (TestClient, Arc<HealthCheck>) {
    let health = Arc::new(
        HealthCheck::new(
            BuildInfo::from_build_env().into(),
            Duration::from_secs(30),
            critical_timeout,
        )
        .unwrap(),
    );
    health
        .add_check(STORE_CHECK_NAME, Arc::new(StoreChecker::new(store.clone())))
        .unwrap();

    let router = create_router(
        AppState::new(store),
        health.clone(),
        WriteAccess::Disabled,
        None,
    );
    (TestClient::new(router), health)
}

#[tokio::test]
async fn health_returns_json_report() {
    let response = client().get("/health").await;

    response.assert_status(StatusCode::OK);
    let content_type = response.header("content-type").unwrap();
    assert!(content_type.contains("application/json"));

    let report: Value = response.json();
    assert_eq!(report["status"], "OK");
    assert_eq!(report["version"]["language"], "rust");
    assert!(report["version"]["version"].is_string());
    assert!(report["start_time"].is_string());
    assert!(report["uptime"].is_number());
    assert!(report["checks"].is_array());
}

#[tokio::test]
async fn passing_store_check_is_ok() {
    let (client, health) = client_with_check(Arc::new(MemoryStore::new()), Duration::from_secs(90));
    health.run_checks().await;

    let response = client.get("/health").await;
    response.assert_status(StatusCode::OK);

    let report: Value = response.json();
    assert_eq!(report["checks"][0]["name"], "Mongo DB");
    assert_eq!(report["checks"][0]["status"], "OK");
}

#[tokio::test]
async fn unchecked_store_is_warning_during_grace_period() {
    let (client, _health) = client_with_check(Arc::new(MemoryStore::new()), Duration::from_secs(90));

    let response = client.get("/health").await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let report: Value = response.json();
    assert_eq!(report["status"], "WARNING");
}

#[tokio::test]
async fn failing_store_past_critical_timeout_is_critical() {
    let (client, health) = client_with_check(Arc::new(BrokenStore), Duration::ZERO);
    health.run_checks().await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let response = client.get("/health").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let report: Value = response.json();
    assert_eq!(report["status"], "CRITICAL");
    assert_eq!(report["checks"][0]["status"], "CRITICAL");
    assert!(report["checks"][0]["last_failure"].is_string());
}
