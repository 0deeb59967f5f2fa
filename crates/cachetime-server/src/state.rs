//! Application state.

use std::sync::Arc;

use cachetime_store::DataStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The cache time store.
    data_store: Arc<dyn DataStore>,
}

impl AppState {
    /// Creates a new AppState with the given store.
    pub fn new(data_store: Arc<dyn DataStore>) -> Self {
        Self { data_store }
    }

    /// Returns a reference to the store.
    pub fn data_store(&self) -> &dyn DataStore {
        self.data_store.as_ref()
    }
}
