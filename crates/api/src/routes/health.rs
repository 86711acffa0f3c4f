use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when both backends answer, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub db_healthy: bool,
    pub search_healthy: bool,
}

/// GET /health -- reports database and search index reachability.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db, search_healthy) = tokio::join!(
        quotedex_db::health_check(&state.pool),
        state.search.is_healthy()
    );
    let db_healthy = db.is_ok();

    let status = if db_healthy && search_healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        search_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
