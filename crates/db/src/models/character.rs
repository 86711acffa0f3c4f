//! Character entity model and DTOs.

use quotedex_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::source::SourceView;

/// A row from the `characters` table.
#[derive(Debug, Clone, FromRow)]
pub struct Character {
    pub id: DbId,
    pub source_id: DbId,
    pub name: String,
    pub alias: Vec<String>,
    pub info: String,
    pub avatar: String,
    pub contributor_id: Option<DbId>,
    /// Number of quotes whose `character_ids` include this character.
    pub quotes_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Client-editable character fields, already normalized.
#[derive(Debug, Clone)]
pub struct CharacterFields {
    pub source_id: DbId,
    pub name: String,
    pub alias: Vec<String>,
    pub info: String,
    pub avatar: String,
}

/// DTO for creating a new character.
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    pub fields: CharacterFields,
    pub contributor_id: DbId,
}

/// Response shape for a character.
///
/// Either `sourceId` or `source` is present, never both: once the source is
/// hydrated the raw reference is dropped. A hydrated source that no longer
/// exists serializes as `"source": null`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView {
    #[serde(rename = "_id")]
    pub id: DbId,
    pub name: String,
    pub alias: Vec<String>,
    pub info: String,
    pub avatar: String,
    pub quotes_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Option<SourceView>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CharacterView {
    /// Replace the raw `sourceId` with the resolved source.
    pub fn with_source(mut self, source: Option<SourceView>) -> Self {
        self.source_id = None;
        self.source = Some(source);
        self
    }
}

impl From<Character> for CharacterView {
    fn from(character: Character) -> Self {
        Self {
            id: character.id,
            name: character.name,
            alias: character.alias,
            info: character.info,
            avatar: character.avatar,
            quotes_count: character.quotes_count,
            source_id: Some(character.source_id),
            source: None,
            created_at: character.created_at,
            updated_at: character.updated_at,
        }
    }
}
