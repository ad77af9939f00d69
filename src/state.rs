//! Application state shared across handlers and workers.

use crate::catalog::Catalog;
use crate::tasks::TaskStore;
use std::sync::Arc;

/// Cloned into every handler. The catalog is read-only after startup; the
/// task store is the process's only shared mutable state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub tasks: TaskStore,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            tasks: TaskStore::new(),
        }
    }
}
