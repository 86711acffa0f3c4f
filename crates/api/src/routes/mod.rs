pub mod auth;
pub mod character;
pub mod health;
pub mod quote;
pub mod source;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth                          authenticate (POST)
/// /auth/register                 register (POST)
///
/// /characters                    list, create (GET, POST)
/// /characters/check              existence check (GET)
/// /characters/search             keyword search (GET)
/// /characters/mine               caller's characters (GET, auth)
/// /characters/{id}               get, replace (GET, PUT)
/// /characters/{id}/quotes        quotes featuring the character (GET)
///
/// /sources                       list, create (GET, POST)
/// /sources/check                 existence check (GET)
/// /sources/search                keyword search (GET)
/// /sources/mine                  caller's sources, cursor paged (GET, auth)
/// /sources/{id}                  get, replace (GET, PUT)
/// /sources/{id}/characters       characters of the source (GET)
///
/// /quotes                        list, create (GET, POST)
/// /quotes/search                 substring search (GET)
/// /quotes/mine                   caller's quotes (GET, auth)
/// /quotes/{id}                   get, replace (GET, PUT)
/// /quotes/{id}/like              like, unlike (PUT, DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/characters", character::router())
        .nest("/sources", source::router())
        .nest("/quotes", quote::router())
}
