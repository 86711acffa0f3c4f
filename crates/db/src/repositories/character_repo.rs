//! Repository for the `characters` table.

use quotedex_core::catalog::ExistenceProbe;
use quotedex_core::pagination::PageRequest;
use quotedex_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::character::{Character, CharacterFields, CreateCharacter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, source_id, name, alias, info, avatar, contributor_id, \
                       quotes_count, created_at, updated_at";

/// Provides CRUD, listing, and existence checks for characters, plus the
/// `quotes_count` bookkeeping driven by quote writes.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCharacter) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (source_id, name, alias, info, avatar, contributor_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(input.fields.source_id)
            .bind(&input.fields.name)
            .bind(&input.fields.alias)
            .bind(&input.fields.info)
            .bind(&input.fields.avatar)
            .bind(input.contributor_id)
            .fetch_one(pool)
            .await
    }

    /// Find a character by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch every character whose id is in `ids`, in no particular order.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Character>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = ANY($1)");
        sqlx::query_as::<_, Character>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Return the subset of `ids` that has no matching row, in input order.
    pub async fn find_missing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found: Vec<DbId> =
            sqlx::query_scalar::<_, DbId>("SELECT id FROM characters WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(pool)
                .await?;
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// Replace all editable fields of a character. `quotes_count` and the
    /// contributor are untouched.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        fields: &CharacterFields,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                source_id = $2,
                name = $3,
                alias = $4,
                info = $5,
                avatar = $6,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(fields.source_id)
            .bind(&fields.name)
            .bind(&fields.alias)
            .bind(&fields.info)
            .bind(&fields.avatar)
            .fetch_optional(pool)
            .await
    }

    /// One page of all characters ordered by id, plus the total row count.
    pub async fn list_page(
        pool: &PgPool,
        page: PageRequest,
    ) -> Result<(Vec<Character>, i64), sqlx::Error> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM characters")
            .fetch_one(pool)
            .await?;
        let query =
            format!("SELECT {COLUMNS} FROM characters ORDER BY id ASC LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, Character>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok((rows, total))
    }

    /// One page of the characters belonging to `source_id`, plus their count.
    pub async fn list_page_by_source(
        pool: &PgPool,
        source_id: DbId,
        page: PageRequest,
    ) -> Result<(Vec<Character>, i64), sqlx::Error> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM characters WHERE source_id = $1")
                .bind(source_id)
                .fetch_one(pool)
                .await?;
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE source_id = $1
             ORDER BY id ASC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Character>(&query)
            .bind(source_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok((rows, total))
    }

    /// Whether a character in `source_id` matches the probe's name or shares
    /// an alias with it.
    pub async fn exists_in_source(
        pool: &PgPool,
        source_id: DbId,
        probe: &ExistenceProbe,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM characters
                WHERE source_id = $1 AND (name = $2 OR alias && $3)
             )",
        )
        .bind(source_id)
        .bind(&probe.name)
        .bind(&probe.alias)
        .fetch_one(pool)
        .await
    }

    /// Shift `quotes_count` by `delta` for every id in `ids`, never below zero.
    ///
    /// Takes a connection so quote writes can run it inside their transaction.
    pub async fn adjust_quotes_count(
        conn: &mut PgConnection,
        ids: &[DbId],
        delta: i32,
    ) -> Result<u64, sqlx::Error> {
        if ids.is_empty() || delta == 0 {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE characters
             SET quotes_count = GREATEST(quotes_count + $2, 0)
             WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(delta)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Up to `limit` characters with `id > after`, ascending. Used for reindexing.
    pub async fn list_after(
        pool: &PgPool,
        after: DbId,
        limit: i64,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM characters WHERE id > $1 ORDER BY id ASC LIMIT $2");
        sqlx::query_as::<_, Character>(&query)
            .bind(after)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
