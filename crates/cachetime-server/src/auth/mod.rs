//! Caller authentication for write routes.
//!
//! Reads are always open. Whether the write route exists at all, and whether
//! it checks the caller, is fixed when the router is built:
//!
//! - publishing deployments → [`WriteAccess::Authenticated`]
//! - web deployments with writes enabled → [`WriteAccess::Open`]
//! - other web deployments → [`WriteAccess::Disabled`]

mod identity;
mod middleware;
mod zebedee;

use std::fmt;
use std::sync::Arc;

pub use identity::{CallerToken, FLORENCE_TOKEN_HEADER, Identity, IdentityError, IdentityVerifier};
pub use middleware::{UNAUTHORIZED_MESSAGE, require_identity};
pub use zebedee::ZebedeeClient;

/// How the write route is exposed.
#[derive(Clone)]
pub enum WriteAccess {
    /// The write route is not registered.
    Disabled,
    /// The write route is registered without an identity check.
    Open,
    /// The write route is registered behind the identity gate.
    Authenticated(Arc<dyn IdentityVerifier>),
}

impl WriteAccess {
    /// Chooses the mode for a deployment.
    ///
    /// `verifier` is only consulted in publishing mode; it is an error for it
    /// to be missing there.
    pub fn for_deployment(
        is_publishing: bool,
        enable_web_writes: bool,
        verifier: Option<Arc<dyn IdentityVerifier>>,
    ) -> Result<Self, IdentityError> {
        match (is_publishing, enable_web_writes) {
            (true, _) => verifier.map(Self::Authenticated).ok_or_else(|| {
                IdentityError::Unavailable("no identity verifier configured".into())
            }),
            (false, true) => Ok(Self::Open),
            (false, false) => Ok(Self::Disabled),
        }
    }

    pub fn is_registered(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl fmt::Debug for WriteAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Open => f.write_str("Open"),
            Self::Authenticated(_) => f.write_str("Authenticated"),
        }
    }
}
