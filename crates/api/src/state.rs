use std::sync::Arc;

use quotedex_search::SearchClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted internally and the rest
/// sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: quotedex_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Secondary keyword index.
    pub search: Arc<SearchClient>,
}
