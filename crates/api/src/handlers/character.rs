//! Handlers for the `/characters` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use quotedex_core::catalog::{
    normalize_alias, optional_text, require_id, require_keyword, require_text, ExistenceProbe,
    MAX_NAME_LEN, MAX_TEXT_LEN,
};
use quotedex_core::error::CoreError;
use quotedex_core::pagination::OffsetPage;
use quotedex_core::types::DbId;
use quotedex_db::models::character::{CharacterFields, CharacterView, CreateCharacter};
use quotedex_db::repositories::{CharacterRepo, SourceRepo};
use quotedex_search::documents::CHARACTER_INDEX;
use quotedex_search::query::SearchRequest;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, IdPath};
use crate::hydrate::{character_view, character_views, in_rank_order};
use crate::middleware::auth::AuthUser;
use crate::query::QueryPairs;
use crate::response::{ExistResponse, SearchPage};
use crate::search_sync;
use crate::state::AppState;

/// Body of `POST /characters` and `PUT /characters/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInput {
    pub name: Option<String>,
    pub alias: Option<Vec<String>>,
    pub info: Option<String>,
    pub source_id: Option<DbId>,
    pub avatar: Option<String>,
}

impl CharacterInput {
    /// Validate and normalize. Omitted optional fields become empty.
    pub fn into_fields(self) -> Result<CharacterFields, CoreError> {
        Ok(CharacterFields {
            source_id: require_id("sourceId", self.source_id)?,
            name: require_text("name", self.name.as_deref(), MAX_NAME_LEN)?,
            alias: normalize_alias(self.alias.as_deref())?,
            info: optional_text("info", self.info.as_deref(), MAX_TEXT_LEN)?,
            avatar: optional_text("avatar", self.avatar.as_deref(), MAX_TEXT_LEN)?,
        })
    }
}

async fn ensure_source_exists(state: &AppState, source_id: DbId) -> AppResult<()> {
    match SourceRepo::find_by_id(&state.pool, source_id).await? {
        Some(_) => Ok(()),
        None => Err(CoreError::DanglingReference {
            entity: "Source",
            id: source_id,
        }
        .into()),
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/characters
pub async fn list(
    State(state): State<AppState>,
    query: QueryPairs,
) -> AppResult<Json<OffsetPage<CharacterView>>> {
    let page = query.page(state.config.paging)?;
    let (rows, total) = CharacterRepo::list_page(&state.pool, page).await?;
    Ok(Json(OffsetPage::new(rows, total, page).map(CharacterView::from)))
}

/// GET /api/v1/characters/check?name=&alias=&sourceId=
pub async fn check(
    State(state): State<AppState>,
    query: QueryPairs,
) -> AppResult<Json<ExistResponse>> {
    let source_id = require_id("sourceId", query.int("sourceId")?)?;
    let probe = ExistenceProbe::new(query.first("name"), &query.all("alias"))?;
    let exist = CharacterRepo::exists_in_source(&state.pool, source_id, &probe).await?;
    Ok(Json(ExistResponse { exist }))
}

/// GET /api/v1/characters/search?kw=&page=&perPage=&with_source=
///
/// Most-quoted matches first; rows come from the store in rank order.
pub async fn search(
    State(state): State<AppState>,
    query: QueryPairs,
) -> AppResult<Json<SearchPage<CharacterView>>> {
    let keyword = require_keyword(query.first("kw"))?;
    let page = query.page(state.config.paging)?;
    let with_source = query.flag("with_source")?;

    let hits = state
        .search
        .search_ids(&SearchRequest::characters_by_keyword(&keyword, page))
        .await?;
    if hits.ids.is_empty() {
        return Ok(Json(SearchPage::empty(hits.total, page.per_page)));
    }

    let rows = CharacterRepo::find_by_ids(&state.pool, &hits.ids).await?;
    let rows = in_rank_order(CHARACTER_INDEX, &hits, rows, |c| c.id);
    let objects = character_views(&state.pool, rows, with_source).await?;

    Ok(Json(SearchPage {
        total: hits.total,
        per_page: page.per_page,
        objects,
    }))
}

/// GET /api/v1/characters/mine
///
/// The caller's characters, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
    query: QueryPairs,
) -> AppResult<Json<SearchPage<CharacterView>>> {
    let page = query.page(state.config.paging)?;

    let hits = state
        .search
        .search_ids(&SearchRequest::characters_by_contributor(user.user_id, page))
        .await?;
    if hits.ids.is_empty() {
        return Ok(Json(SearchPage::empty(hits.total, page.per_page)));
    }

    let rows = CharacterRepo::find_by_ids(&state.pool, &hits.ids).await?;
    let objects = in_rank_order(CHARACTER_INDEX, &hits, rows, |c| c.id)
        .into_iter()
        .map(CharacterView::from)
        .collect();

    Ok(Json(SearchPage {
        total: hits.total,
        per_page: page.per_page,
        objects,
    }))
}

/// GET /api/v1/characters/{id}?with_source=
pub async fn get_by_id(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    query: QueryPairs,
) -> AppResult<Json<CharacterView>> {
    let with_source = query.flag("with_source")?;
    let character = CharacterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Character", id))?;
    Ok(Json(character_view(&state.pool, character, with_source).await?))
}

/// GET /api/v1/sources/{id}/characters
pub async fn list_by_source(
    State(state): State<AppState>,
    IdPath(source_id): IdPath,
    query: QueryPairs,
) -> AppResult<Json<OffsetPage<CharacterView>>> {
    let page = query.page(state.config.paging)?;
    if SourceRepo::find_by_id(&state.pool, source_id).await?.is_none() {
        return Err(AppError::not_found("Source", source_id));
    }
    let (rows, total) = CharacterRepo::list_page_by_source(&state.pool, source_id, page).await?;
    Ok(Json(OffsetPage::new(rows, total, page).map(CharacterView::from)))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/characters
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CharacterInput>,
) -> AppResult<(StatusCode, Json<CharacterView>)> {
    let fields = input.into_fields()?;
    ensure_source_exists(&state, fields.source_id).await?;

    let input = CreateCharacter {
        fields,
        contributor_id: user.user_id,
    };
    let character = CharacterRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = user.user_id, character_id = character.id, "Character created");

    search_sync::index_character(&state.search, &character).await;
    Ok((StatusCode::CREATED, Json(character.into())))
}

/// PUT /api/v1/characters/{id}
///
/// Full replace: omitted optional fields are reset.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(input): AppJson<CharacterInput>,
) -> AppResult<Json<CharacterView>> {
    let fields = input.into_fields()?;
    ensure_source_exists(&state, fields.source_id).await?;

    let character = CharacterRepo::update(&state.pool, id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found("Character", id))?;
    tracing::info!(user_id = user.user_id, character_id = id, "Character updated");

    search_sync::index_character(&state.search, &character).await;
    Ok(Json(character.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn input() -> CharacterInput {
        CharacterInput {
            name: Some(" Paul ".into()),
            alias: None,
            info: None,
            source_id: Some(3),
            avatar: None,
        }
    }

    #[test]
    fn omitted_optionals_become_empty() {
        let fields = input().into_fields().unwrap();
        assert_eq!(fields.name, "Paul");
        assert!(fields.alias.is_empty());
        assert_eq!(fields.info, "");
        assert_eq!(fields.avatar, "");
        assert_eq!(fields.source_id, 3);
    }

    #[test]
    fn source_id_is_required() {
        let mut body = input();
        body.source_id = None;
        assert_matches!(body.into_fields(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn name_is_required() {
        let mut body = input();
        body.name = Some("".into());
        assert_matches!(body.into_fields(), Err(CoreError::Validation(_)));
    }
}
