//! # Cache Time Store
//!
//! Persistence port for cache time records and its adapters.
//!
//! ## Features
//!
//! - Async trait-based [`DataStore`] abstraction
//! - MongoDB adapter with per-query timeouts and optional TLS, credentials,
//!   majority read/write concerns
//! - In-memory adapter with the same ordering and filtering semantics
//!
//! ## Example
//!
//! ```ignore
//! use cachetime_store::{DataStore, MongoConfig, MongoStore};
//! use cachetime_core::PageRequest;
//!
//! let store = MongoStore::connect(&MongoConfig::default()).await?;
//! let page = store.get_cache_times(&PageRequest::default()).await?;
//! ```

pub mod error;
pub mod memory;
pub mod mongo;
pub mod store;

// Re-exports
pub use error::StoreError;
pub use memory::MemoryStore;
pub use mongo::{MongoConfig, MongoStore};
pub use store::DataStore;

// Re-export cachetime_core for consumers
pub use cachetime_core;
