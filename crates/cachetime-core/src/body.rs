//! Strict decoding of upsert request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::CacheTime;

/// Body accepted by the upsert endpoint.
///
/// The id comes from the URL, never from the body. Unknown fields are
/// rejected. `path` defaults to empty so that a missing path is reported by
/// validation together with any id problems instead of failing the decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheTimeBody {
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub collection_id: Option<String>,

    #[serde(default)]
    pub release_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub etag: Option<String>,
}

impl CacheTimeBody {
    /// Combines the body with the id from the URL.
    pub fn into_cache_time(self, id: impl Into<String>) -> CacheTime {
        CacheTime {
            id: id.into(),
            path: self.path,
            collection_id: self.collection_id,
            release_time: self.release_time,
            etag: self.etag,
        }
    }
}

/// Reasons a request body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BodyError {
    /// The request carried no bytes.
    #[error("bad request: empty request body")]
    Empty,

    /// The body contained a field the resource does not have.
    #[error("bad request: {0}")]
    UnknownField(String),

    /// A field had the wrong JSON type.
    #[error("bad request: {0}")]
    TypeMismatch(String),

    /// The body was not a JSON object of the expected shape.
    #[error("bad request: {0}")]
    Malformed(String),
}

/// Decodes an upsert body, rejecting empty payloads and unknown fields.
pub fn decode_body(bytes: &[u8]) -> Result<CacheTimeBody, BodyError> {
    if bytes.is_empty() {
        return Err(BodyError::Empty);
    }

    serde_json::from_slice(bytes).map_err(|e| {
        let message = e.to_string();
        if message.starts_with("unknown field") {
            BodyError::UnknownField(message)
        } else if message.starts_with("invalid type") {
            BodyError::TypeMismatch(message)
        } else {
            BodyError::Malformed(message)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_body() {
        let body = decode_body(br#"{"path":"/economy/gdp"}"#).unwrap();

        assert_eq!(body.path, "/economy/gdp");
        assert!(body.collection_id.is_none());
        assert!(body.release_time.is_none());
        assert!(body.etag.is_none());
    }

    #[test]
    fn decodes_full_body() {
        let body = decode_body(
            br#"{"path":"/a","collection_id":"c1","release_time":"2024-01-02T03:04:05Z","etag":"e"}"#,
        )
        .unwrap();

        assert_eq!(body.collection_id.as_deref(), Some("c1"));
        assert_eq!(body.etag.as_deref(), Some("e"));
        assert_eq!(
            body.release_time.unwrap().to_rfc3339(),
            "2024-01-02T03:04:05+00:00"
        );
    }

    #[test]
    fn empty_body_is_rejected() {
        let err = decode_body(b"").unwrap_err();

        assert_eq!(err, BodyError::Empty);
        assert_eq!(err.to_string(), "bad request: empty request body");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = decode_body(br#"{"path":"x","extra_field":"y"}"#).unwrap_err();

        assert!(matches!(err, BodyError::UnknownField(_)));
        assert!(err.to_string().contains("unknown field"));
        assert!(err.to_string().contains("extra_field"));
    }

    #[test]
    fn id_in_body_is_unknown() {
        let err = decode_body(br#"{"_id":"abc","path":"x"}"#).unwrap_err();
        assert!(matches!(err, BodyError::UnknownField(_)));
    }

    #[test]
    fn wrong_type_is_a_type_mismatch() {
        let err = decode_body(br#"{"path":42}"#).unwrap_err();

        assert!(matches!(err, BodyError::TypeMismatch(_)));
        assert!(err.to_string().contains("invalid type"));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = decode_body(b"{not json").unwrap_err();
        assert!(matches!(err, BodyError::Malformed(_)));
    }

    #[test]
    fn missing_path_decodes_to_empty() {
        let body = decode_body(br#"{"etag":"x"}"#).unwrap();
        assert!(body.path.is_empty());
    }

    #[test]
    fn into_cache_time_uses_url_id() {
        let body = decode_body(br#"{"path":"/a"}"#).unwrap();
        let record = body.into_cache_time("a1b2c3d4e5f67890123456789abcdef0");

        assert_eq!(record.id, "a1b2c3d4e5f67890123456789abcdef0");
        assert_eq!(record.path, "/a");
    }
}
