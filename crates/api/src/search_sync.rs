//! Keeping the search index in step with the store.
//!
//! Upserts after a successful write are best-effort: a failure is logged and
//! the request still succeeds, since the store is the system of record.

use quotedex_core::types::DbId;
use quotedex_db::models::character::Character;
use quotedex_db::models::quote::Quote;
use quotedex_db::models::source::Source;
use quotedex_db::repositories::{CharacterRepo, QuoteRepo, SourceRepo};
use quotedex_db::DbPool;
use quotedex_search::documents::{CharacterDocument, QuoteDocument, SourceDocument};
use quotedex_search::{SearchClient, SearchError};

use crate::error::AppResult;

/// Rows pushed per batch during a full reindex.
const REINDEX_BATCH: i64 = 500;

fn log_failure(entity: &'static str, ids: &[DbId], result: Result<(), SearchError>) {
    if let Err(err) = result {
        tracing::warn!(entity, ?ids, error = %err, "Search index upsert failed");
    }
}

pub async fn index_source(search: &SearchClient, source: &Source) {
    let result = search.index_sources(&[SourceDocument::from(source)]).await;
    log_failure("source", &[source.id], result);
}

pub async fn index_character(search: &SearchClient, character: &Character) {
    let result = search
        .index_characters(&[CharacterDocument::from(character)])
        .await;
    log_failure("character", &[character.id], result);
}

pub async fn index_quote(search: &SearchClient, quote: &Quote) {
    let result = search.index_quotes(&[QuoteDocument::from(quote)]).await;
    log_failure("quote", &[quote.id], result);
}

/// Re-read characters whose `quotesCount` changed and push them again.
pub async fn reindex_characters(pool: &DbPool, search: &SearchClient, ids: &[DbId]) {
    if ids.is_empty() {
        return;
    }
    let characters = match CharacterRepo::find_by_ids(pool, ids).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(?ids, error = %err, "Could not reload characters for reindexing");
            return;
        }
    };
    let docs: Vec<CharacterDocument> = characters.iter().map(CharacterDocument::from).collect();
    log_failure("character", ids, search.index_characters(&docs).await);
}

/// Counts of documents pushed by [`reindex_all`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReindexReport {
    pub sources: usize,
    pub characters: usize,
    pub quotes: usize,
}

/// Push every stored entity to the index, walking each table in id order.
pub async fn reindex_all(pool: &DbPool, search: &SearchClient) -> AppResult<ReindexReport> {
    let mut report = ReindexReport::default();

    let mut after: DbId = 0;
    loop {
        let rows = SourceRepo::list_after(pool, after, REINDEX_BATCH).await?;
        let Some(last) = rows.last() else { break };
        after = last.id;
        let docs: Vec<SourceDocument> = rows.iter().map(SourceDocument::from).collect();
        search.index_sources(&docs).await?;
        report.sources += docs.len();
    }

    after = 0;
    loop {
        let rows = CharacterRepo::list_after(pool, after, REINDEX_BATCH).await?;
        let Some(last) = rows.last() else { break };
        after = last.id;
        let docs: Vec<CharacterDocument> = rows.iter().map(CharacterDocument::from).collect();
        search.index_characters(&docs).await?;
        report.characters += docs.len();
    }

    after = 0;
    loop {
        let rows = QuoteRepo::list_after(pool, after, REINDEX_BATCH).await?;
        let Some(last) = rows.last() else { break };
        after = last.id;
        let docs: Vec<QuoteDocument> = rows.iter().map(QuoteDocument::from).collect();
        search.index_quotes(&docs).await?;
        report.quotes += docs.len();
    }

    tracing::info!(
        sources = report.sources,
        characters = report.characters,
        quotes = report.quotes,
        "Search reindex complete"
    );
    Ok(report)
}
