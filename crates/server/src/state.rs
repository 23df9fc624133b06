use std::sync::Arc;

use cancha_warehouse::{Catalogs, QueryExecutor};

/// Shared application state, constructed once in `main` and injected into
/// every handler. No ambient globals: credentials live inside the executor,
/// catalog names travel alongside it for the query templates.
pub struct AppState {
    pub executor: Arc<dyn QueryExecutor>,
    pub catalogs: Catalogs,
}

impl AppState {
    pub fn new(executor: Arc<dyn QueryExecutor>, catalogs: Catalogs) -> Self {
        Self { executor, catalogs }
    }
}
