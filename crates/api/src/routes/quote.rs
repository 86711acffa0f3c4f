//! Route definitions for the `/quotes` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::quote;
use crate::state::AppState;

/// Routes mounted at `/quotes`.
///
/// ```text
/// GET    /            -> list
/// POST   /            -> create (requires auth)
/// GET    /search      -> search
/// GET    /mine        -> list_mine (requires auth)
/// GET    /{id}        -> get_by_id (counts a view)
/// PUT    /{id}        -> update (requires auth)
/// PUT    /{id}/like   -> like (requires auth)
/// DELETE /{id}/like   -> unlike (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(quote::list).post(quote::create))
        .route("/search", get(quote::search))
        .route("/mine", get(quote::list_mine))
        .route("/{id}", get(quote::get_by_id).put(quote::update))
        .route("/{id}/like", put(quote::like).delete(quote::unlike))
}
