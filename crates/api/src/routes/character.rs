//! Route definitions for the `/characters` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{character, quote};
use crate::state::AppState;

/// Routes mounted at `/characters`.
///
/// ```text
/// GET  /              -> list
/// POST /              -> create (requires auth)
/// GET  /check         -> check
/// GET  /search        -> search
/// GET  /mine          -> list_mine (requires auth)
/// GET  /{id}          -> get_by_id
/// PUT  /{id}          -> update (requires auth)
/// GET  /{id}/quotes   -> quote::list_by_character
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(character::list).post(character::create))
        .route("/check", get(character::check))
        .route("/search", get(character::search))
        .route("/mine", get(character::list_mine))
        .route("/{id}", get(character::get_by_id).put(character::update))
        .route("/{id}/quotes", get(quote::list_by_character))
}
