//! Prometheus metrics for the HTTP layer and the data store.

pub mod http;
pub mod setup;
pub mod store;

pub use setup::init_metrics;
pub use store::InstrumentedStore;
