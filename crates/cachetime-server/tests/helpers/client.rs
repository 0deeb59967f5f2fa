//! Test client helpers.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, Response, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Drives a router in-process, without a socket.
pub struct TestClient {
    app: Router,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self { app }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.get_with_headers(uri, vec![]).await
    }

    pub async fn get_with_headers(&self, uri: &str, headers: Vec<(&str, &str)>) -> TestResponse {
        self.send("GET", uri, headers, Body::empty()).await
    }

    pub async fn put(&self, uri: &str, body: impl Into<Body>) -> TestResponse {
        self.put_with_headers(uri, vec![], body).await
    }

    pub async fn put_with_headers(
        &self,
        uri: &str,
        headers: Vec<(&str, &str)>,
        body: impl Into<Body>,
    ) -> TestResponse {
        let mut headers = headers;
        headers.push(("content-type", "application/json"));
        self.send("PUT", uri, headers, body.into()).await
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        headers: Vec<(&str, &str)>,
        body: Body,
    ) -> TestResponse {
        let mut builder = Request::builder().uri(uri).method(method);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("Request failed");

        TestResponse::from_response(response).await
    }
}

/// Collected response with assertion helpers.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        Self {
            status,
            headers,
            body,
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Body is not valid UTF-8")
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Expected header '{}' to exist",
            name
        );
        self
    }

    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let value = self
            .header(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));

        assert_eq!(
            value, expected,
            "Expected header '{}' to be '{}' but got '{}'",
            name, expected, value
        );
        self
    }

    /// Asserts a JSON `{"error": ...}` body with exactly this message.
    pub fn assert_error(&self, expected: &str) -> &Self {
        let body: serde_json::Value = self.json();
        assert_eq!(
            body["error"], expected,
            "Unexpected error body: {}",
            self.text()
        );
        self
    }
}
