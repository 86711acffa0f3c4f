//! Query-string access shared by every handler.
//!
//! The query is kept as raw `(key, value)` pairs so repeated keys
//! (`alias=a&alias=b`) and bare flags (`?with_source`) survive extraction.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use quotedex_core::error::CoreError;
use quotedex_core::flags::parse_flag;
use quotedex_core::pagination::{CursorDirection, CursorRequest, PageRequest};
use quotedex_core::types::DbId;

use crate::config::PagingConfig;
use crate::error::AppError;

/// Raw query pairs in request order.
#[derive(Debug, Clone, Default)]
pub struct QueryPairs(pub Vec<(String, String)>);

impl<S> FromRequestParts<S> for QueryPairs
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(QueryPairs(pairs))
    }
}

impl QueryPairs {
    /// First value for `key`, if present.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order. `alias[]=x` is accepted as `alias=x`.
    pub fn all(&self, key: &str) -> Vec<String> {
        let bracketed = format!("{key}[]");
        self.0
            .iter()
            .filter(|(k, _)| k == key || *k == bracketed)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Optional integer parameter; present but non-numeric is a 400.
    pub fn int(&self, key: &str) -> Result<Option<i64>, CoreError> {
        match self.first(key).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| CoreError::validation(format!("{key} must be an integer, got '{raw}'"))),
        }
    }

    /// Boolean expansion flag such as `with_source`.
    pub fn flag(&self, key: &str) -> Result<bool, CoreError> {
        parse_flag(key, self.first(key))
    }

    /// `?page=&perPage=` clamped to the configured bounds.
    pub fn page(&self, paging: PagingConfig) -> Result<PageRequest, CoreError> {
        Ok(PageRequest::new(
            self.int("page")?,
            self.int("perPage")?,
            paging.per_page,
            paging.max_per_page,
        ))
    }

    /// `?paginationId=&direction=&perPage=` for cursor listings.
    pub fn cursor(&self, paging: PagingConfig) -> Result<CursorRequest, CoreError> {
        let cursor: Option<DbId> = self.int("paginationId")?;
        let direction = match self.first("direction") {
            Some(raw) => raw.parse::<CursorDirection>()?,
            None => CursorDirection::default(),
        };
        let limit = PageRequest::new(None, self.int("perPage")?, paging.per_page, paging.max_per_page)
            .limit();
        Ok(CursorRequest {
            cursor,
            direction,
            limit,
        })
    }
}
