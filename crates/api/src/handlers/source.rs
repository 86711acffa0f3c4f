//! Handlers for the `/sources` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use quotedex_core::catalog::{
    normalize_alias, optional_text, require_keyword, require_text, ExistenceProbe, MAX_NAME_LEN,
    MAX_TEXT_LEN,
};
use quotedex_core::error::CoreError;
use quotedex_core::pagination::{CursorPage, OffsetPage};
use quotedex_db::models::source::{CreateSource, SourceFields, SourceView};
use quotedex_db::repositories::SourceRepo;
use quotedex_search::documents::SOURCE_INDEX;
use quotedex_search::query::SearchRequest;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, IdPath};
use crate::hydrate::in_rank_order;
use crate::middleware::auth::AuthUser;
use crate::query::QueryPairs;
use crate::response::{ExistResponse, SearchPage};
use crate::search_sync;
use crate::state::AppState;

/// Body of `POST /sources` and `PUT /sources/{id}`.
#[derive(Debug, Deserialize)]
pub struct SourceInput {
    pub name: Option<String>,
    pub alias: Option<Vec<String>>,
    pub info: Option<String>,
}

impl SourceInput {
    pub fn into_fields(self) -> Result<SourceFields, CoreError> {
        Ok(SourceFields {
            name: require_text("name", self.name.as_deref(), MAX_NAME_LEN)?,
            alias: normalize_alias(self.alias.as_deref())?,
            info: optional_text("info", self.info.as_deref(), MAX_TEXT_LEN)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/sources
pub async fn list(
    State(state): State<AppState>,
    query: QueryPairs,
) -> AppResult<Json<OffsetPage<SourceView>>> {
    let page = query.page(state.config.paging)?;
    let (rows, total) = SourceRepo::list_page(&state.pool, page).await?;
    Ok(Json(OffsetPage::new(rows, total, page).map(SourceView::from)))
}

/// GET /api/v1/sources/check?name=&alias=
pub async fn check(
    State(state): State<AppState>,
    query: QueryPairs,
) -> AppResult<Json<ExistResponse>> {
    let probe = ExistenceProbe::new(query.first("name"), &query.all("alias"))?;
    let exist = SourceRepo::exists_by_name_or_alias(&state.pool, &probe).await?;
    Ok(Json(ExistResponse { exist }))
}

/// GET /api/v1/sources/search?kw=&page=&perPage=
pub async fn search(
    State(state): State<AppState>,
    query: QueryPairs,
) -> AppResult<Json<SearchPage<SourceView>>> {
    let keyword = require_keyword(query.first("kw"))?;
    let page = query.page(state.config.paging)?;

    let hits = state
        .search
        .search_ids(&SearchRequest::sources_by_keyword(&keyword, page))
        .await?;
    if hits.ids.is_empty() {
        return Ok(Json(SearchPage::empty(hits.total, page.per_page)));
    }

    let rows = SourceRepo::find_by_ids(&state.pool, &hits.ids).await?;
    let objects = in_rank_order(SOURCE_INDEX, &hits, rows, |s| s.id)
        .into_iter()
        .map(SourceView::from)
        .collect();

    Ok(Json(SearchPage {
        total: hits.total,
        per_page: page.per_page,
        objects,
    }))
}

/// GET /api/v1/sources/mine?paginationId=&direction=&perPage=
///
/// Cursor-paginated listing of the caller's sources.
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
    query: QueryPairs,
) -> AppResult<Json<CursorPage<SourceView>>> {
    let request = query.cursor(state.config.paging)?;
    let rows = SourceRepo::list_by_contributor(&state.pool, user.user_id, &request).await?;
    let objects: Vec<SourceView> = rows.into_iter().map(SourceView::from).collect();
    Ok(Json(CursorPage::new(objects, request.limit, |s| s.id)))
}

/// GET /api/v1/sources/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<SourceView>> {
    let source = SourceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Source", id))?;
    Ok(Json(source.into()))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/sources
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<SourceInput>,
) -> AppResult<(StatusCode, Json<SourceView>)> {
    let input = CreateSource {
        fields: input.into_fields()?,
        contributor_id: user.user_id,
    };
    let source = SourceRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = user.user_id, source_id = source.id, "Source created");

    search_sync::index_source(&state.search, &source).await;
    Ok((StatusCode::CREATED, Json(source.into())))
}

/// PUT /api/v1/sources/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(input): AppJson<SourceInput>,
) -> AppResult<Json<SourceView>> {
    let fields = input.into_fields()?;
    let source = SourceRepo::update(&state.pool, id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found("Source", id))?;
    tracing::info!(user_id = user.user_id, source_id = id, "Source updated");

    search_sync::index_source(&state.search, &source).await;
    Ok(Json(source.into()))
}
