//! Repository for the `quotes` table.
//!
//! Quote writes also maintain `characters.quotes_count` inside the same
//! transaction, and like toggles keep `like_count = cardinality(liker_ids)`
//! within a single statement.

use quotedex_core::catalog::escape_like;
use quotedex_core::pagination::PageRequest;
use quotedex_core::types::DbId;
use sqlx::PgPool;

use crate::models::quote::{CreateQuote, Quote, QuoteFields};
use crate::repositories::CharacterRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, character_ids, quote, reference, scene, contributor_id, \
                       view_count, liker_ids, like_count, created_at, updated_at";

/// Result of a like/unlike toggle.
#[derive(Debug, Clone)]
pub struct LikeOutcome {
    pub quote: Quote,
    /// `false` when the toggle was a no-op (already liked / not liked).
    pub changed: bool,
}

/// Result of a full-replace quote update.
#[derive(Debug, Clone)]
pub struct QuoteUpdate {
    pub quote: Quote,
    /// Characters whose `quotes_count` changed (removed or added references).
    pub touched_character_ids: Vec<DbId>,
}

/// Provides CRUD, listing, view counting, and like toggles for quotes.
pub struct QuoteRepo;

impl QuoteRepo {
    /// Insert a new quote and bump `quotes_count` on its characters.
    pub async fn create(pool: &PgPool, input: &CreateQuote) -> Result<Quote, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO quotes (character_ids, quote, reference, scene, contributor_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let quote = sqlx::query_as::<_, Quote>(&query)
            .bind(&input.fields.character_ids)
            .bind(&input.fields.quote)
            .bind(&input.fields.reference)
            .bind(&input.fields.scene)
            .bind(input.contributor_id)
            .fetch_one(&mut *tx)
            .await?;

        CharacterRepo::adjust_quotes_count(&mut tx, &quote.character_ids, 1).await?;

        tx.commit().await?;
        Ok(quote)
    }

    /// Replace all editable fields of a quote, moving `quotes_count` from
    /// dropped characters to newly referenced ones.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        fields: &QuoteFields,
    ) -> Result<Option<QuoteUpdate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous = sqlx::query_scalar::<_, Vec<DbId>>(
            "SELECT character_ids FROM quotes WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE quotes SET
                character_ids = $2,
                quote = $3,
                reference = $4,
                scene = $5,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let quote = sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .bind(&fields.character_ids)
            .bind(&fields.quote)
            .bind(&fields.reference)
            .bind(&fields.scene)
            .fetch_one(&mut *tx)
            .await?;

        let removed: Vec<DbId> = previous
            .iter()
            .copied()
            .filter(|c| !quote.character_ids.contains(c))
            .collect();
        let added: Vec<DbId> = quote
            .character_ids
            .iter()
            .copied()
            .filter(|c| !previous.contains(c))
            .collect();

        CharacterRepo::adjust_quotes_count(&mut tx, &removed, -1).await?;
        CharacterRepo::adjust_quotes_count(&mut tx, &added, 1).await?;

        tx.commit().await?;

        let mut touched_character_ids = removed;
        touched_character_ids.extend(added);
        Ok(Some(QuoteUpdate {
            quote,
            touched_character_ids,
        }))
    }

    /// Find a quote by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Quote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quotes WHERE id = $1");
        sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch every quote whose id is in `ids`, in no particular order.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Quote>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM quotes WHERE id = ANY($1)");
        sqlx::query_as::<_, Quote>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Increment `view_count` and return the updated row.
    pub async fn record_view(pool: &PgPool, id: DbId) -> Result<Option<Quote>, sqlx::Error> {
        let query = format!(
            "UPDATE quotes SET view_count = view_count + 1
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of all quotes ordered by id, plus the total row count.
    pub async fn list_page(
        pool: &PgPool,
        page: PageRequest,
    ) -> Result<(Vec<Quote>, i64), sqlx::Error> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quotes")
            .fetch_one(pool)
            .await?;
        let query = format!("SELECT {COLUMNS} FROM quotes ORDER BY id ASC LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, Quote>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok((rows, total))
    }

    /// One page of the quotes that reference `character_id`, plus their count.
    pub async fn list_page_by_character(
        pool: &PgPool,
        character_id: DbId,
        page: PageRequest,
    ) -> Result<(Vec<Quote>, i64), sqlx::Error> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quotes WHERE character_ids @> ARRAY[$1]::BIGINT[]",
        )
        .bind(character_id)
        .fetch_one(pool)
        .await?;
        let query = format!(
            "SELECT {COLUMNS} FROM quotes
             WHERE character_ids @> ARRAY[$1]::BIGINT[]
             ORDER BY id ASC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Quote>(&query)
            .bind(character_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok((rows, total))
    }

    /// Case-insensitive substring match on the quote text, oldest first.
    pub async fn search_text(
        pool: &PgPool,
        keyword: &str,
        limit: i64,
    ) -> Result<Vec<Quote>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(keyword));
        let query = format!(
            "SELECT {COLUMNS} FROM quotes
             WHERE quote ILIKE $1
             ORDER BY id ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, Quote>(&query)
            .bind(pattern)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Add `user_id` to the front of `liker_ids` unless already present.
    ///
    /// Returns `None` if the quote does not exist.
    pub async fn add_liker(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<LikeOutcome>, sqlx::Error> {
        let query = format!(
            "UPDATE quotes SET
                liker_ids = array_prepend($2, liker_ids),
                like_count = cardinality(liker_ids) + 1
             WHERE id = $1 AND NOT ($2 = ANY(liker_ids))
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Self::toggle_outcome(pool, id, updated).await
    }

    /// Remove `user_id` from `liker_ids` if present.
    ///
    /// Returns `None` if the quote does not exist.
    pub async fn remove_liker(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<LikeOutcome>, sqlx::Error> {
        let query = format!(
            "UPDATE quotes SET
                liker_ids = array_remove(liker_ids, $2),
                like_count = cardinality(array_remove(liker_ids, $2))
             WHERE id = $1 AND $2 = ANY(liker_ids)
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Self::toggle_outcome(pool, id, updated).await
    }

    /// A toggle that matched no row is either a no-op or a missing quote.
    async fn toggle_outcome(
        pool: &PgPool,
        id: DbId,
        updated: Option<Quote>,
    ) -> Result<Option<LikeOutcome>, sqlx::Error> {
        if let Some(quote) = updated {
            return Ok(Some(LikeOutcome {
                quote,
                changed: true,
            }));
        }
        Ok(Self::find_by_id(pool, id)
            .await?
            .map(|quote| LikeOutcome {
                quote,
                changed: false,
            }))
    }

    /// Up to `limit` quotes with `id > after`, ascending. Used for reindexing.
    pub async fn list_after(
        pool: &PgPool,
        after: DbId,
        limit: i64,
    ) -> Result<Vec<Quote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quotes WHERE id > $1 ORDER BY id ASC LIMIT $2");
        sqlx::query_as::<_, Quote>(&query)
            .bind(after)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
