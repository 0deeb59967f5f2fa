//! Caller identity and the verifier port.

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use serde::{Deserialize, Serialize};

/// Header carrying a user token.
pub const FLORENCE_TOKEN_HEADER: &str = "x-florence-token";

/// Errors raised while verifying a caller.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// No token was presented.
    #[error("no caller token provided")]
    MissingToken,

    /// The identity provider refused the token.
    #[error("caller identity rejected: {0}")]
    Rejected(String),

    /// The identity provider could not be asked.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl IdentityError {
    /// Returns true if the caller, not the provider, is at fault.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::MissingToken | Self::Rejected(_))
    }
}

/// How a caller presented its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerToken {
    /// `X-Florence-Token`
    User(String),
    /// `Authorization: Bearer ...`
    Service(String),
}

impl CallerToken {
    /// Reads the caller token from request headers.
    ///
    /// A user token wins when both are present.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let user = headers
            .get(FLORENCE_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(token) = user {
            return Some(Self::User(token.to_string()));
        }

        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|token| Self::Service(token.to_string()))
    }

    /// The raw token value.
    pub fn value(&self) -> &str {
        match self {
            Self::User(token) | Self::Service(token) => token,
        }
    }
}

/// A verified caller, attached to the request for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub identifier: String,
}

impl Identity {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    pub fn caller(&self) -> &str {
        &self.identifier
    }
}

/// Port for checking a caller token against an identity provider.
///
/// # Implementors
///
/// - `ZebedeeClient` - Asks the Zebedee `/identity` endpoint
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolves the token to a caller identity.
    ///
    /// # Errors
    ///
    /// - `IdentityError::Rejected` if the provider refuses the token
    /// - `IdentityError::Unavailable` if the provider could not be reached
    async fn verify(&self, token: &CallerToken) -> Result<Identity, IdentityError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_florence_token() {
        let mut headers = HeaderMap::new();
        headers.insert(FLORENCE_TOKEN_HEADER, HeaderValue::from_static("user-token"));

        assert_eq!(
            CallerToken::from_headers(&headers),
            Some(CallerToken::User("user-token".into()))
        );
    }

    #[test]
    fn reads_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer svc-token"));

        assert_eq!(
            CallerToken::from_headers(&headers),
            Some(CallerToken::Service("svc-token".into()))
        );
    }

    #[test]
    fn user_token_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(FLORENCE_TOKEN_HEADER, HeaderValue::from_static("user-token"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer svc-token"));

        assert_eq!(
            CallerToken::from_headers(&headers).map(|t| t.value().to_string()),
            Some("user-token".into())
        );
    }

    #[test]
    fn ignores_blank_and_non_bearer_values() {
        let mut headers = HeaderMap::new();
        headers.insert(FLORENCE_TOKEN_HEADER, HeaderValue::from_static("  "));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));

        assert!(CallerToken::from_headers(&headers).is_none());
    }

    #[test]
    fn error_classification() {
        assert!(IdentityError::MissingToken.is_unauthorized());
        assert!(IdentityError::Rejected("401".into()).is_unauthorized());
        assert!(!IdentityError::Unavailable("refused".into()).is_unauthorized());
    }
}
