use std::sync::Arc;

use crate::config::ServerConfig;

/// State shared by the placement API handlers. Clones share the pool.
#[derive(Clone)]
pub struct AppState {
    /// Pool for the catalog, position and placement repositories.
    pub pool: edusite_db::DbPool,
    pub config: Arc<ServerConfig>,
}
