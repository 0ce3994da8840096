//! Application state shared across handlers

use std::sync::Arc;

use crate::db::Store;
use crate::services::Services;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    services: Services,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                services: Services::new(store),
            }),
        }
    }

    pub fn services(&self) -> &Services {
        &self.inner.services
    }
}
