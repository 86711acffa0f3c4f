//! Route definitions for the `/sources` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{character, source};
use crate::state::AppState;

/// Routes mounted at `/sources`.
///
/// ```text
/// GET  /                  -> list
/// POST /                  -> create (requires auth)
/// GET  /check             -> check
/// GET  /search            -> search
/// GET  /mine              -> list_mine (requires auth)
/// GET  /{id}              -> get_by_id
/// PUT  /{id}              -> update (requires auth)
/// GET  /{id}/characters   -> character::list_by_source
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(source::list).post(source::create))
        .route("/check", get(source::check))
        .route("/search", get(source::search))
        .route("/mine", get(source::list_mine))
        .route("/{id}", get(source::get_by_id).put(source::update))
        .route("/{id}/characters", get(character::list_by_source))
}
