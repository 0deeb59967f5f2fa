use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cachetime_core::{BodyError, ValidationError};
use cachetime_store::StoreError;
use serde::{Deserialize, Serialize};

/// Message returned for any failure whose detail stays in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug)]
pub enum AppError {
    /// Malformed id, body or query parameters
    BadRequest(String),

    /// No cache time for the id
    NotFound(String),

    /// Caller identity missing or rejected
    Unauthorized(String),

    /// Store or dependency failure; the detail is logged, never returned
    Internal,
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    /// Translates a store failure, logging what the caller will not see.
    pub fn from_store(err: StoreError) -> Self {
        if err.is_not_found() {
            return AppError::NotFound(err.to_string());
        }

        tracing::error!(error = %err, transient = err.is_transient(), "Data store failure");
        AppError::Internal
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<BodyError> for AppError {
    fn from(err: BodyError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) | AppError::Unauthorized(msg) => {
                msg
            },
            AppError::Internal => INTERNAL_ERROR_MESSAGE.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_store_error_maps_to_404() {
        let err = AppError::from_store(StoreError::not_found("abc"));

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "cachetime not found"));
    }

    #[test]
    fn other_store_errors_hide_detail() {
        let err = AppError::from_store(StoreError::unavailable("mongo://secret-host refused"));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, AppError::Internal));
    }

    #[test]
    fn body_errors_are_bad_requests() {
        let err = AppError::from(BodyError::Empty);

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "bad request: empty request body"));
    }
}
