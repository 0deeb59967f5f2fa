//! Request extractors for the cache time endpoints.

pub mod path;
pub mod query;

pub use path::CacheTimePath;
pub use query::ListQuery;
