//! HTTP client for the Zebedee identity endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use tracing::debug;

use super::identity::{CallerToken, FLORENCE_TOKEN_HEADER, Identity, IdentityError, IdentityVerifier};

const IDENTITY_PATH: &str = "/identity";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifies caller tokens by asking `GET {base_url}/identity`.
#[derive(Clone)]
pub struct ZebedeeClient {
    client: reqwest::Client,
    base_url: String,
}

impl ZebedeeClient {
    pub fn new(base_url: &str) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl IdentityVerifier for ZebedeeClient {
    async fn verify(&self, token: &CallerToken) -> Result<Identity, IdentityError> {
        let url = format!("{}{}", self.base_url, IDENTITY_PATH);

        let request = match token {
            CallerToken::User(value) => self.client.get(&url).header(FLORENCE_TOKEN_HEADER, value),
            CallerToken::Service(value) => self
                .client
                .get(&url)
                .header(AUTHORIZATION, format!("Bearer {}", value)),
        };

        let response = request
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Identity provider responded");

        match status {
            StatusCode::OK => response
                .json::<Identity>()
                .await
                .map_err(|e| IdentityError::Unavailable(format!("invalid identity response: {}", e))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                Err(IdentityError::Rejected(status.to_string()))
            },
            other => Err(IdentityError::Unavailable(format!(
                "unexpected status {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ZebedeeClient::new("http://localhost:8082/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8082");
    }
}
