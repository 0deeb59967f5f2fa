use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::Deserialize;

use crate::error::AppError;

/// Extractor para rutas /v1/cache-times/{id}
#[derive(Debug, Deserialize)]
pub struct CacheTimePath {
    pub id: String,
}

impl<S> FromRequestParts<S> for CacheTimePath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(path) = Path::<CacheTimePath>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::info!(error = %rejection.body_text(), "Invalid path parameters");
                AppError::BadRequest(rejection.body_text())
            })?;

        Ok(path)
    }
}
