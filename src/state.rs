//! Shared application state for all routes.

use crate::store::CustomerStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Record store handle, injected at startup.
    pub store: Arc<dyn CustomerStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        AppState { store }
    }
}
