//! Tests de middleware.

mod helpers;

use helpers::client;
use uuid::Uuid;

// === Request ID ===

#[tokio::test]
async fn response_includes_request_id() {
    let response = client().get("/health").await;

    response.assert_header_exists("x-request-id");
}

#[tokio::test]
async fn generated_request_id_is_uuid_v4() {
    let response = client().get("/health").await;

    let id = response.header("x-request-id").unwrap();
    let parsed = Uuid::parse_str(id).unwrap_or_else(|_| panic!("Invalid UUID: {}", id));

    assert_eq!(parsed.get_version_num(), 4);
}

#[tokio::test]
async fn propagates_incoming_request_id() {
    let custom_id = "my-custom-request-id-12345";

    let response = client()
        .get_with_headers("/health", vec![("x-request-id", custom_id)])
        .await;

    response.assert_header("x-request-id", custom_id);
}

#[tokio::test]
async fn generates_different_ids_for_each_request() {
    let client = client();
    let response1 = client.get("/health").await;
    let response2 = client.get("/health").await;

    assert_ne!(
        response1.header("x-request-id").unwrap(),
        response2.header("x-request-id").unwrap()
    );
}

// === Request ID on every route ===

#[tokio::test]
async fn request_id_present_on_error_responses() {
    let client = client();

    client
        .get("/v1/cache-times/not-an-id")
        .await
        .assert_header_exists("x-request-id");
    client
        .get("/v1/cache-times?limit=0")
        .await
        .assert_header_exists("x-request-id");
    client
        .put("/v1/cache-times/0123456789abcdef0123456789abcdef", "")
        .await
        .assert_header_exists("x-request-id");
}
