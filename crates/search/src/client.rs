//! Meilisearch client wrapper.
//!
//! Reads are bounded by a per-request timeout and retried with a fixed
//! backoff on transient failures. Writes are single attempts; callers decide
//! whether a failed upsert matters.
//!
//! Index settings are applied once per process, before the first read or
//! write that reaches the engine. A failed attempt leaves the client unready
//! so the next call tries again; the engine would otherwise auto-create an
//! index on first upsert without the filterable and sortable attributes
//! every listing depends on.

use std::time::{Duration, Instant};

use meilisearch_sdk::client::Client;
use meilisearch_sdk::search::Selectors;
use quotedex_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::documents::{
    CharacterDocument, QuoteDocument, SourceDocument, CHARACTER_INDEX, PRIMARY_KEY, QUOTE_INDEX,
    SCHEMAS, SOURCE_INDEX,
};
use crate::error::SearchError;
use crate::query::SearchRequest;

/// Only the primary key is needed from a hit.
const ID_ONLY: &[&str] = &[PRIMARY_KEY];

/// Connection and resilience settings.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub url: String,
    pub api_key: Option<String>,
    /// Upper bound on a single engine round trip.
    pub timeout: Duration,
    /// Extra attempts after the first failed read.
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7700".to_string(),
            api_key: None,
            timeout: Duration::from_millis(2000),
            max_retries: 2,
            retry_backoff: Duration::from_millis(100),
        }
    }
}

/// Ranked ids for one page plus the engine's hit total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    pub total: u64,
    pub ids: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
struct IdHit {
    id: DbId,
}

pub struct SearchClient {
    client: Client,
    config: SearchConfig,
    /// Set once every index carries its settings.
    settings_applied: OnceCell<()>,
}

impl SearchClient {
    /// Build the client. No network traffic happens here.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let client = Client::new(config.url.clone(), config.api_key.clone())?;
        Ok(Self {
            client,
            config,
            settings_applied: OnceCell::new(),
        })
    }

    /// Whether the engine answers its health endpoint.
    pub async fn is_healthy(&self) -> bool {
        matches!(
            tokio::time::timeout(self.config.timeout, self.client.is_healthy()).await,
            Ok(true)
        )
    }

    /// Apply index settings unless an earlier call already did.
    ///
    /// Concurrent callers wait on the same attempt. On failure nothing is
    /// recorded and the next caller retries.
    pub async fn ensure_indexes(&self) -> Result<(), SearchError> {
        self.settings_applied
            .get_or_try_init(|| self.apply_settings())
            .await?;
        Ok(())
    }

    /// Settings gate for the request path, bounded by the round-trip timeout.
    async fn ready(&self) -> Result<(), SearchError> {
        if self.settings_applied.initialized() {
            return Ok(());
        }
        let started = Instant::now();
        tokio::time::timeout(self.config.timeout, self.ensure_indexes())
            .await
            .map_err(|_| SearchError::Timeout {
                elapsed_ms: elapsed_ms(started),
            })?
    }

    /// Push searchable/filterable/sortable settings to every index,
    /// creating indexes that do not exist yet.
    async fn apply_settings(&self) -> Result<(), SearchError> {
        for schema in SCHEMAS {
            let task = self
                .client
                .index(schema.name)
                .set_settings(&schema.settings())
                .await?
                .wait_for_completion(&self.client, None, Some(Duration::from_secs(30)))
                .await?;
            if task.is_failure() {
                return Err(SearchError::SettingsRejected { index: schema.name });
            }
            tracing::info!(index = schema.name, "Search index settings applied");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub async fn index_characters(&self, docs: &[CharacterDocument]) -> Result<(), SearchError> {
        self.upsert(CHARACTER_INDEX, docs).await
    }

    pub async fn index_quotes(&self, docs: &[QuoteDocument]) -> Result<(), SearchError> {
        self.upsert(QUOTE_INDEX, docs).await
    }

    pub async fn index_sources(&self, docs: &[SourceDocument]) -> Result<(), SearchError> {
        self.upsert(SOURCE_INDEX, docs).await
    }

    async fn upsert<T>(&self, index: &'static str, docs: &[T]) -> Result<(), SearchError>
    where
        T: Serialize + Send + Sync,
    {
        if docs.is_empty() {
            return Ok(());
        }
        self.ready().await?;
        let started = Instant::now();
        let index_handle = self.client.index(index);
        let task = tokio::time::timeout(
            self.config.timeout,
            index_handle.add_or_update(docs, Some(PRIMARY_KEY)),
        )
        .await
        .map_err(|_| SearchError::Timeout {
            elapsed_ms: elapsed_ms(started),
        })??;
        tracing::debug!(
            index,
            documents = docs.len(),
            task_uid = task.task_uid,
            "Search documents enqueued"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Run a ranked id lookup, retrying transient failures.
    pub async fn search_ids(&self, request: &SearchRequest) -> Result<SearchHits, SearchError> {
        self.ready().await?;
        let mut attempt: u32 = 0;
        loop {
            let started = Instant::now();
            let outcome = tokio::time::timeout(self.config.timeout, self.execute(request)).await;
            let err = match outcome {
                Ok(Ok(hits)) => {
                    tracing::debug!(
                        index = request.index,
                        hits = hits.ids.len(),
                        total = hits.total,
                        elapsed_ms = elapsed_ms(started),
                        "Search completed"
                    );
                    return Ok(hits);
                }
                Ok(Err(e)) => e,
                Err(_) => SearchError::Timeout {
                    elapsed_ms: elapsed_ms(started),
                },
            };

            if !err.is_transient() || attempt >= self.config.max_retries {
                return Err(err);
            }
            attempt += 1;
            tracing::warn!(
                index = request.index,
                attempt,
                error = %err,
                "Search failed, retrying"
            );
            tokio::time::sleep(self.config.retry_backoff).await;
        }
    }

    async fn execute(&self, request: &SearchRequest) -> Result<SearchHits, SearchError> {
        let index = self.client.index(request.index);
        let sort = request.sort_refs();

        let mut query = index.search();
        query
            .with_offset(request.offset)
            .with_limit(request.limit)
            .with_attributes_to_retrieve(Selectors::Some(ID_ONLY));
        if let Some(q) = request.query.as_deref() {
            query.with_query(q);
        }
        if let Some(filter) = request.filter.as_deref() {
            query.with_filter(filter);
        }
        if !sort.is_empty() {
            query.with_sort(&sort);
        }

        let results = query.execute::<IdHit>().await?;
        let ids: Vec<DbId> = results.hits.iter().map(|hit| hit.result.id).collect();
        let total = results.estimated_total_hits.unwrap_or(ids.len()) as u64;
        Ok(SearchHits { total, ids })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
