//! Identity gate for write routes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use super::identity::{CallerToken, IdentityError, IdentityVerifier};
use crate::error::AppError;

/// Message returned to callers without a valid identity.
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";

/// Verifies the caller before the wrapped handler runs.
///
/// A verified [`Identity`](super::Identity) is inserted into the request
/// extensions. Missing or rejected tokens yield 401; an unreachable provider
/// yields 500.
pub async fn require_identity(
    State(verifier): State<Arc<dyn IdentityVerifier>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let result = match CallerToken::from_headers(request.headers()) {
        Some(token) => verifier.verify(&token).await,
        None => Err(IdentityError::MissingToken),
    };

    match result {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        },
        Err(e) if e.is_unauthorized() => {
            info!(error = %e, "Caller identity check failed");
            Err(AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()))
        },
        Err(e) => {
            warn!(error = %e, "Identity provider could not verify caller");
            Err(AppError::Internal)
        },
    }
}
