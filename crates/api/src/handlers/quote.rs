//! Handlers for the `/quotes` resource, including likes.
//!
//! Every quote response carries `liked` when the request has a usable token.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use quotedex_core::catalog::{
    optional_text, require_character_ids, require_keyword, require_text, MAX_QUOTE_LEN,
    MAX_TEXT_LEN, QUOTE_KEYWORD_LIMIT,
};
use quotedex_core::error::CoreError;
use quotedex_core::likes::LikeAction;
use quotedex_core::pagination::OffsetPage;
use quotedex_core::types::DbId;
use quotedex_db::models::quote::{CreateQuote, QuoteFields, QuoteView};
use quotedex_db::repositories::{CharacterRepo, QuoteRepo};
use quotedex_search::documents::QUOTE_INDEX;
use quotedex_search::query::SearchRequest;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, IdPath};
use crate::hydrate::{
    in_rank_order, quote_view, quote_views, quote_views_with_characters, QuoteExpansion,
};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::query::QueryPairs;
use crate::response::SearchPage;
use crate::search_sync;
use crate::state::AppState;

/// Body of `POST /quotes` and `PUT /quotes/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInput {
    pub character_ids: Option<Vec<DbId>>,
    pub quote: Option<String>,
    pub reference: Option<String>,
    pub scene: Option<String>,
}

impl QuoteInput {
    pub fn into_fields(self) -> Result<QuoteFields, CoreError> {
        Ok(QuoteFields {
            character_ids: require_character_ids(self.character_ids.as_deref())?,
            quote: require_text("quote", self.quote.as_deref(), MAX_QUOTE_LEN)?,
            reference: optional_text("reference", self.reference.as_deref(), MAX_TEXT_LEN)?,
            scene: optional_text("scene", self.scene.as_deref(), MAX_TEXT_LEN)?,
        })
    }
}

/// Every referenced character must exist at write time.
async fn ensure_characters_exist(state: &AppState, ids: &[DbId]) -> AppResult<()> {
    let missing = CharacterRepo::find_missing_ids(&state.pool, ids).await?;
    match missing.first() {
        Some(&id) => Err(CoreError::DanglingReference {
            entity: "Character",
            id,
        }
        .into()),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/quotes
pub async fn list(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    query: QueryPairs,
) -> AppResult<Json<OffsetPage<QuoteView>>> {
    let page = query.page(state.config.paging)?;
    let (rows, total) = QuoteRepo::list_page(&state.pool, page).await?;
    let objects = quote_views_with_characters(&state.pool, rows, viewer.user_id()).await?;
    Ok(Json(OffsetPage::new(objects, total, page)))
}

/// GET /api/v1/characters/{id}/quotes
pub async fn list_by_character(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    IdPath(character_id): IdPath,
    query: QueryPairs,
) -> AppResult<Json<OffsetPage<QuoteView>>> {
    let page = query.page(state.config.paging)?;
    if CharacterRepo::find_by_id(&state.pool, character_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Character", character_id));
    }
    let (rows, total) = QuoteRepo::list_page_by_character(&state.pool, character_id, page).await?;
    let objects = quote_views_with_characters(&state.pool, rows, viewer.user_id()).await?;
    Ok(Json(OffsetPage::new(objects, total, page)))
}

/// GET /api/v1/quotes/search?kw=
///
/// Case-insensitive substring match on the quote text, capped at 20.
pub async fn search(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    query: QueryPairs,
) -> AppResult<Json<Vec<QuoteView>>> {
    let keyword = require_keyword(query.first("kw"))?;
    let rows = QuoteRepo::search_text(&state.pool, &keyword, QUOTE_KEYWORD_LIMIT).await?;
    Ok(Json(quote_views(rows, viewer.user_id())))
}

/// GET /api/v1/quotes/mine
///
/// The caller's quotes, oldest first.
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
    query: QueryPairs,
) -> AppResult<Json<SearchPage<QuoteView>>> {
    let page = query.page(state.config.paging)?;

    let hits = state
        .search
        .search_ids(&SearchRequest::quotes_by_contributor(user.user_id, page))
        .await?;
    if hits.ids.is_empty() {
        return Ok(Json(SearchPage::empty(hits.total, page.per_page)));
    }

    let rows = QuoteRepo::find_by_ids(&state.pool, &hits.ids).await?;
    let rows = in_rank_order(QUOTE_INDEX, &hits, rows, |q| q.id);

    Ok(Json(SearchPage {
        total: hits.total,
        per_page: page.per_page,
        objects: quote_views(rows, Some(user.user_id)),
    }))
}

/// GET /api/v1/quotes/{id}?with_character_all=&with_contributor=
///
/// Counts as a view.
pub async fn get_by_id(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    IdPath(id): IdPath,
    query: QueryPairs,
) -> AppResult<Json<QuoteView>> {
    let expand = QuoteExpansion {
        characters: query.flag("with_character_all")?,
        contributor: query.flag("with_contributor")?,
    };

    let quote = QuoteRepo::record_view(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Quote", id))?;

    Ok(Json(
        quote_view(&state.pool, quote, viewer.user_id(), expand).await?,
    ))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/quotes
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<QuoteInput>,
) -> AppResult<(StatusCode, Json<QuoteView>)> {
    let fields = input.into_fields()?;
    ensure_characters_exist(&state, &fields.character_ids).await?;

    let input = CreateQuote {
        fields,
        contributor_id: user.user_id,
    };
    let quote = QuoteRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = user.user_id, quote_id = quote.id, "Quote created");

    search_sync::index_quote(&state.search, &quote).await;
    search_sync::reindex_characters(&state.pool, &state.search, &quote.character_ids).await;

    Ok((
        StatusCode::CREATED,
        Json(QuoteView::new(quote, Some(user.user_id))),
    ))
}

/// PUT /api/v1/quotes/{id}
///
/// Full replace. `quotesCount` moves from dropped characters to added ones.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(input): AppJson<QuoteInput>,
) -> AppResult<Json<QuoteView>> {
    let fields = input.into_fields()?;
    ensure_characters_exist(&state, &fields.character_ids).await?;

    let updated = QuoteRepo::update(&state.pool, id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found("Quote", id))?;
    tracing::info!(user_id = user.user_id, quote_id = id, "Quote updated");

    search_sync::index_quote(&state.search, &updated.quote).await;
    search_sync::reindex_characters(&state.pool, &state.search, &updated.touched_character_ids)
        .await;

    Ok(Json(QuoteView::new(updated.quote, Some(user.user_id))))
}

async fn toggle_like(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
    action: LikeAction,
) -> AppResult<Json<QuoteView>> {
    let outcome = match action {
        LikeAction::Like => QuoteRepo::add_liker(&state.pool, id, user.user_id).await?,
        LikeAction::Unlike => QuoteRepo::remove_liker(&state.pool, id, user.user_id).await?,
    }
    .ok_or_else(|| AppError::not_found("Quote", id))?;

    tracing::info!(
        user_id = user.user_id,
        quote_id = id,
        action = action.as_str(),
        changed = outcome.changed,
        "Quote like toggled"
    );
    Ok(Json(QuoteView::new(outcome.quote, Some(user.user_id))))
}

/// PUT /api/v1/quotes/{id}/like
///
/// Idempotent: liking twice counts once.
pub async fn like(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<QuoteView>> {
    toggle_like(&state, &user, id, LikeAction::Like).await
}

/// DELETE /api/v1/quotes/{id}/like
pub async fn unlike(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<QuoteView>> {
    toggle_like(&state, &user, id, LikeAction::Unlike).await
}
