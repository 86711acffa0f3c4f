//! Source entity model and DTOs.

use quotedex_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sources` table.
#[derive(Debug, Clone, FromRow)]
pub struct Source {
    pub id: DbId,
    pub name: String,
    pub alias: Vec<String>,
    pub info: String,
    pub contributor_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Client-editable source fields, already normalized.
///
/// Updates replace every field; there is no partial patch.
#[derive(Debug, Clone)]
pub struct SourceFields {
    pub name: String,
    pub alias: Vec<String>,
    pub info: String,
}

/// DTO for creating a new source.
#[derive(Debug, Clone)]
pub struct CreateSource {
    pub fields: SourceFields,
    pub contributor_id: DbId,
}

/// Response shape for a source. `contributorId` is never exposed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceView {
    #[serde(rename = "_id")]
    pub id: DbId,
    pub name: String,
    pub alias: Vec<String>,
    pub info: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Source> for SourceView {
    fn from(source: Source) -> Self {
        Self {
            id: source.id,
            name: source.name,
            alias: source.alias,
            info: source.info,
            created_at: source.created_at,
            updated_at: source.updated_at,
        }
    }
}
