//! Quote entity model and DTOs.

use quotedex_core::likes::{like_count_consistent, liked_by};
use quotedex_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::character::CharacterView;
use crate::models::user::PublicUser;

/// A row from the `quotes` table.
#[derive(Debug, Clone, FromRow)]
pub struct Quote {
    pub id: DbId,
    /// Ordered, non-empty list of referenced characters.
    pub character_ids: Vec<DbId>,
    pub quote: String,
    pub reference: String,
    pub scene: String,
    pub contributor_id: Option<DbId>,
    pub view_count: i32,
    /// Users who liked the quote, most recent first. Always unique.
    pub liker_ids: Vec<DbId>,
    /// Always equal to `liker_ids.len()`.
    pub like_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Client-editable quote fields, already normalized.
#[derive(Debug, Clone)]
pub struct QuoteFields {
    pub character_ids: Vec<DbId>,
    pub quote: String,
    pub reference: String,
    pub scene: String,
}

/// DTO for creating a new quote.
#[derive(Debug, Clone)]
pub struct CreateQuote {
    pub fields: QuoteFields,
    pub contributor_id: DbId,
}

/// Response shape for a quote.
///
/// `characterIds` is replaced by `characters` when hydrated. `contributor`
/// appears only when requested. `liked` appears only when the request carried
/// a user. `likerIds` and `contributorId` are never exposed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteView {
    #[serde(rename = "_id")]
    pub id: DbId,
    pub quote: String,
    pub reference: String,
    pub scene: String,
    pub view_count: i32,
    pub like_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_ids: Option<Vec<DbId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<CharacterView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor: Option<Option<PublicUser>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QuoteView {
    /// Build the view as seen by `viewer` (the requesting user, if any).
    pub fn new(quote: Quote, viewer: Option<DbId>) -> Self {
        debug_assert!(
            like_count_consistent(&quote.liker_ids, quote.like_count),
            "quote {} like_count out of step with liker_ids",
            quote.id
        );
        Self {
            id: quote.id,
            liked: liked_by(&quote.liker_ids, viewer),
            quote: quote.quote,
            reference: quote.reference,
            scene: quote.scene,
            view_count: quote.view_count,
            like_count: quote.like_count,
            character_ids: Some(quote.character_ids),
            characters: None,
            contributor: None,
            created_at: quote.created_at,
            updated_at: quote.updated_at,
        }
    }

    /// The raw character reference list, if not yet hydrated.
    pub fn character_ids(&self) -> &[DbId] {
        self.character_ids.as_deref().unwrap_or_default()
    }

    /// Replace `characterIds` with the resolved characters.
    pub fn with_characters(mut self, characters: Vec<CharacterView>) -> Self {
        self.character_ids = None;
        self.characters = Some(characters);
        self
    }

    pub fn with_contributor(mut self, contributor: Option<PublicUser>) -> Self {
        self.contributor = Some(contributor);
        self
    }
}
