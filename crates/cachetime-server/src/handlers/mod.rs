//! HTTP handlers.

pub mod cache_times;
pub mod health;
pub mod metrics;
