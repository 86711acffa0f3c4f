//! Offset and cursor pagination helpers.
//!
//! Offset pagination (`?page=&perPage=`) backs the plain listings; cursor
//! pagination (`?paginationId=&direction=`) backs the per-contributor source
//! listing, where stability under concurrent inserts matters more than
//! random access.

use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Default number of items per page when the caller gives none.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Upper bound on a caller-supplied page size.
pub const MAX_PER_PAGE: i64 = 100;

// ---------------------------------------------------------------------------
// Offset pagination
// ---------------------------------------------------------------------------

/// A normalized `(page, per_page)` window. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Clamp caller input: `page >= 1`, `1 <= per_page <= max`.
    pub fn new(page: Option<i64>, per_page: Option<i64>, default: i64, max: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(default).max(1).min(max),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Number of pages needed to show `total` items `per_page` at a time.
pub fn page_count(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        return 0;
    }
    (total + per_page - 1) / per_page
}

/// `{pageCount, objects, total}` listing envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPage<T> {
    pub page_count: i64,
    pub objects: Vec<T>,
    pub total: i64,
}

impl<T> OffsetPage<T> {
    pub fn new(objects: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            page_count: page_count(total, request.per_page),
            objects,
            total,
        }
    }

    /// Transform every object while keeping the counters.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> OffsetPage<U> {
        OffsetPage {
            page_count: self.page_count,
            objects: self.objects.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

// ---------------------------------------------------------------------------
// Cursor pagination
// ---------------------------------------------------------------------------

/// Which side of the cursor to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorDirection {
    /// The page starting at the cursor (`_id >= cursor`).
    #[default]
    Current,
    /// Items after the cursor (`_id > cursor`).
    Next,
    /// Items before the cursor (`_id < cursor`).
    Prev,
}

impl FromStr for CursorDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "current" => Ok(Self::Current),
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            other => Err(CoreError::validation(format!(
                "direction must be one of current, next, prev; got '{other}'"
            ))),
        }
    }
}

/// A cursor page request. Without a cursor the first page is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorRequest {
    pub cursor: Option<DbId>,
    pub direction: CursorDirection,
    pub limit: i64,
}

impl CursorRequest {
    /// SQL comparison against the cursor, or `None` for the first page.
    pub fn comparison(&self) -> Option<(&'static str, DbId)> {
        let cursor = self.cursor?;
        let op = match self.direction {
            CursorDirection::Current => ">=",
            CursorDirection::Next => ">",
            CursorDirection::Prev => "<",
        };
        Some((op, cursor))
    }

    /// `prev` pages are read newest-first so the `limit` closest rows win.
    pub fn reads_descending(&self) -> bool {
        self.cursor.is_some() && self.direction == CursorDirection::Prev
    }

    /// Put fetched rows back in ascending id order.
    pub fn finalize<T>(&self, mut rows: Vec<T>) -> Vec<T> {
        if self.reads_descending() {
            rows.reverse();
        }
        rows
    }
}

/// `{objects, perPage, firstId, lastId}` cursor envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    pub objects: Vec<T>,
    pub per_page: i64,
    pub first_id: Option<DbId>,
    pub last_id: Option<DbId>,
}

impl<T> CursorPage<T> {
    pub fn new(objects: Vec<T>, per_page: i64, id_of: impl Fn(&T) -> DbId) -> Self {
        let first_id = objects.first().map(&id_of);
        let last_id = objects.last().map(&id_of);
        Self {
            objects,
            per_page,
            first_id,
            last_id,
        }
    }
}
