use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use cachetime_core::{DEFAULT_LIMIT, DEFAULT_OFFSET, PageRequest};
use chrono::{DateTime, Utc};

use crate::error::AppError;

pub const OFFSET_ERROR: &str = "offset query parameter must be a non-negative integer";
pub const LIMIT_ERROR: &str = "limit query parameter must be a non-negative and non-zero integer";
pub const RELEASE_TIME_ERROR: &str =
    "release_time query parameter must be a valid RFC3339 timestamp";

/// Query parameters for the list endpoint, kept raw so that bad values get
/// the endpoint's own error messages instead of a generic rejection.
///
/// When a parameter is repeated the first value wins.
#[derive(Debug, Default)]
pub struct ListQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub release_time: Option<String>,
}

impl ListQuery {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "offset" => &mut query.offset,
                "limit" => &mut query.limit,
                "release_time" => &mut query.release_time,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// Validates the parameters, applying defaults for absent or empty ones.
    pub fn into_page_request(self) -> Result<PageRequest, AppError> {
        let offset = match non_empty(self.offset) {
            None => DEFAULT_OFFSET,
            Some(raw) => parse_bounded(&raw, 0)
                .ok_or_else(|| AppError::BadRequest(OFFSET_ERROR.to_string()))?,
        };

        let limit = match non_empty(self.limit) {
            None => DEFAULT_LIMIT,
            Some(raw) => parse_bounded(&raw, 1)
                .ok_or_else(|| AppError::BadRequest(LIMIT_ERROR.to_string()))?,
        };

        let mut request = PageRequest::new(offset, limit);

        if let Some(raw) = non_empty(self.release_time) {
            let release_time = DateTime::parse_from_rfc3339(&raw)
                .map_err(|e| {
                    tracing::info!(release_time = %raw, error = %e, "Invalid release_time format");
                    AppError::BadRequest(RELEASE_TIME_ERROR.to_string())
                })?
                .with_timezone(&Utc);
            request = request.with_release_time(release_time);
        }

        Ok(request)
    }
}

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        Ok(Self::from_pairs(pairs))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parses a signed 64-bit integer no smaller than `min`.
fn parse_bounded(raw: &str, min: i64) -> Option<usize> {
    raw.parse::<i64>()
        .ok()
        .filter(|value| *value >= min)
        .and_then(|value| usize::try_from(value).ok())
}
