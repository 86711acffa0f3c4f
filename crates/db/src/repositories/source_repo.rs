//! Repository for the `sources` table.

use quotedex_core::catalog::ExistenceProbe;
use quotedex_core::pagination::{CursorRequest, PageRequest};
use quotedex_core::types::DbId;
use sqlx::PgPool;

use crate::models::source::{CreateSource, Source, SourceFields};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, alias, info, contributor_id, created_at, updated_at";

/// Provides CRUD, listing, and existence checks for sources.
pub struct SourceRepo;

impl SourceRepo {
    /// Insert a new source, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSource) -> Result<Source, sqlx::Error> {
        let query = format!(
            "INSERT INTO sources (name, alias, info, contributor_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Source>(&query)
            .bind(&input.fields.name)
            .bind(&input.fields.alias)
            .bind(&input.fields.info)
            .bind(input.contributor_id)
            .fetch_one(pool)
            .await
    }

    /// Find a source by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Source>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sources WHERE id = $1");
        sqlx::query_as::<_, Source>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch every source whose id is in `ids`, in no particular order.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Source>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM sources WHERE id = ANY($1)");
        sqlx::query_as::<_, Source>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Replace all editable fields of a source.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        fields: &SourceFields,
    ) -> Result<Option<Source>, sqlx::Error> {
        let query = format!(
            "UPDATE sources SET
                name = $2,
                alias = $3,
                info = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Source>(&query)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.alias)
            .bind(&fields.info)
            .fetch_optional(pool)
            .await
    }

    /// One page of all sources ordered by id, plus the total row count.
    pub async fn list_page(
        pool: &PgPool,
        page: PageRequest,
    ) -> Result<(Vec<Source>, i64), sqlx::Error> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sources")
            .fetch_one(pool)
            .await?;
        let query = format!("SELECT {COLUMNS} FROM sources ORDER BY id ASC LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, Source>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok((rows, total))
    }

    /// Cursor page of sources contributed by `contributor_id`.
    ///
    /// Rows come back in ascending id order regardless of direction.
    pub async fn list_by_contributor(
        pool: &PgPool,
        contributor_id: DbId,
        request: &CursorRequest,
    ) -> Result<Vec<Source>, sqlx::Error> {
        let order = if request.reads_descending() { "DESC" } else { "ASC" };
        let rows = match request.comparison() {
            Some((op, cursor)) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM sources
                     WHERE contributor_id = $1 AND id {op} $2
                     ORDER BY id {order}
                     LIMIT $3"
                );
                sqlx::query_as::<_, Source>(&query)
                    .bind(contributor_id)
                    .bind(cursor)
                    .bind(request.limit)
                    .fetch_all(pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM sources
                     WHERE contributor_id = $1
                     ORDER BY id {order}
                     LIMIT $2"
                );
                sqlx::query_as::<_, Source>(&query)
                    .bind(contributor_id)
                    .bind(request.limit)
                    .fetch_all(pool)
                    .await?
            }
        };
        Ok(request.finalize(rows))
    }

    /// Whether any source matches the probe's name or shares an alias with it.
    pub async fn exists_by_name_or_alias(
        pool: &PgPool,
        probe: &ExistenceProbe,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM sources
                WHERE name = $1 OR alias && $2
             )",
        )
        .bind(&probe.name)
        .bind(&probe.alias)
        .fetch_one(pool)
        .await
    }

    /// Up to `limit` sources with `id > after`, ascending. Used for reindexing.
    pub async fn list_after(
        pool: &PgPool,
        after: DbId,
        limit: i64,
    ) -> Result<Vec<Source>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sources WHERE id > $1 ORDER BY id ASC LIMIT $2");
        sqlx::query_as::<_, Source>(&query)
            .bind(after)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
