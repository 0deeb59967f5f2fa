//! Middleware applied to every route.
//!
//! - `request_id`: generates or propagates `x-request-id`
//! - `log_requests`: structured request logging

mod logging;
mod request_id;

pub use logging::log_requests;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id};
