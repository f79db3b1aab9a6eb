use std::sync::Arc;

use crate::config::Config;
use crate::storage::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL in production, `MemoryStore` in tests.
    pub store: Arc<dyn Store>,
    pub config: Config,
}
