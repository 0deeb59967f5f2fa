//! Cache time endpoint handlers.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
};
use cachetime_core::{CacheTime, CacheTimesList, decode_body, validate_cache_time, validate_id};
use tracing::instrument;

use crate::auth::Identity;
use crate::error::AppError;
use crate::extractors::{CacheTimePath, ListQuery};
use crate::state::AppState;

/// GET /v1/cache-times/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn get_cache_time(
    State(state): State<AppState>,
    path: CacheTimePath,
) -> Result<Json<CacheTime>, AppError> {
    validate_id(&path.id).inspect_err(|_| {
        tracing::info!("Id failed validation checks");
    })?;

    let cache_time = state
        .data_store()
        .get_cache_time(&path.id)
        .await
        .map_err(AppError::from_store)?;

    Ok(Json(cache_time))
}

/// GET /v1/cache-times?offset=&limit=&release_time=
#[instrument(skip_all)]
pub async fn get_cache_times(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<Json<CacheTimesList>, AppError> {
    let request = query.into_page_request()?;

    tracing::debug!(
        offset = request.offset,
        limit = request.limit,
        release_time = ?request.release_time,
        "Listing cache times"
    );

    let page = state
        .data_store()
        .get_cache_times(&request)
        .await
        .map_err(AppError::from_store)?;

    Ok(Json(CacheTimesList::new(
        page.items,
        request.limit,
        request.offset,
        page.total_count,
    )))
}

/// PUT /v1/cache-times/{id}
///
/// Authorization, when required, has already run by the time this executes.
#[instrument(skip_all, fields(id = %path.id))]
pub async fn create_or_update_cache_time(
    State(state): State<AppState>,
    path: CacheTimePath,
    identity: Option<Extension<Identity>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let decoded = decode_body(&body).inspect_err(|e| {
        tracing::info!(error = %e, "Error decoding request body");
    })?;

    validate_cache_time(&path.id, &decoded).inspect_err(|_| {
        tracing::info!("Cache time failed validation checks");
    })?;

    let cache_time = decoded.into_cache_time(path.id);

    state
        .data_store()
        .upsert_cache_time(&cache_time)
        .await
        .map_err(AppError::from_store)?;

    tracing::info!(
        caller = identity.as_ref().map(|Extension(i)| i.caller()).unwrap_or("anonymous"),
        path = %cache_time.path,
        "Cache time upserted"
    );

    Ok(StatusCode::NO_CONTENT)
}
