//! Replacing reference ids with the referenced entities.
//!
//! Missing referenced rows are tolerated: a dangling source or contributor
//! renders as `null`, a dangling character id is skipped.

use std::collections::HashMap;

use futures::future::try_join_all;
use quotedex_core::ordering::order_by_ids;
use quotedex_core::types::DbId;
use quotedex_db::models::character::{Character, CharacterView};
use quotedex_db::models::quote::{Quote, QuoteView};
use quotedex_db::models::source::SourceView;
use quotedex_db::models::user::PublicUser;
use quotedex_db::repositories::{CharacterRepo, SourceRepo, UserRepo};
use quotedex_db::DbPool;
use quotedex_search::SearchHits;

use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// One character, optionally with its source embedded.
pub async fn character_view(
    pool: &DbPool,
    character: Character,
    with_source: bool,
) -> AppResult<CharacterView> {
    if !with_source {
        return Ok(character.into());
    }
    let source = SourceRepo::find_by_id(pool, character.source_id)
        .await?
        .map(SourceView::from);
    Ok(CharacterView::from(character).with_source(source))
}

/// Many characters, optionally with sources embedded. Sources are fetched
/// in one batch and spliced back in input order.
pub async fn character_views(
    pool: &DbPool,
    characters: Vec<Character>,
    with_source: bool,
) -> AppResult<Vec<CharacterView>> {
    if !with_source {
        return Ok(characters.into_iter().map(CharacterView::from).collect());
    }

    let mut source_ids: Vec<DbId> = characters.iter().map(|c| c.source_id).collect();
    source_ids.sort_unstable();
    source_ids.dedup();

    let sources: HashMap<DbId, SourceView> = SourceRepo::find_by_ids(pool, &source_ids)
        .await?
        .into_iter()
        .map(|s| (s.id, SourceView::from(s)))
        .collect();

    Ok(characters
        .into_iter()
        .map(|c| {
            let source = sources.get(&c.source_id).cloned();
            CharacterView::from(c).with_source(source)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// A quote's characters in `characterIds` order.
async fn characters_of(pool: &DbPool, quote_id: DbId, ids: &[DbId]) -> AppResult<Vec<CharacterView>> {
    let found = CharacterRepo::find_by_ids(pool, ids).await?;
    let (ordered, missing) = order_by_ids(ids, found, |c| c.id);
    if !missing.is_empty() {
        tracing::warn!(quote_id, ?missing, "Quote references missing characters");
    }
    Ok(ordered.into_iter().map(CharacterView::from).collect())
}

/// Plain quote views, annotated with `liked` for `viewer`.
pub fn quote_views(quotes: Vec<Quote>, viewer: Option<DbId>) -> Vec<QuoteView> {
    quotes
        .into_iter()
        .map(|q| QuoteView::new(q, viewer))
        .collect()
}

/// Quote views with `characters` embedded.
///
/// Each quote's characters are one batched query; the per-quote queries run
/// concurrently and the result keeps page order. Any failure fails all.
pub async fn quote_views_with_characters(
    pool: &DbPool,
    quotes: Vec<Quote>,
    viewer: Option<DbId>,
) -> AppResult<Vec<QuoteView>> {
    try_join_all(quotes.into_iter().map(|quote| async move {
        let view = QuoteView::new(quote, viewer);
        let characters = characters_of(pool, view.id, view.character_ids()).await?;
        Ok::<_, AppError>(view.with_characters(characters))
    }))
    .await
}

/// Expansion flags of the single-quote read.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteExpansion {
    pub characters: bool,
    pub contributor: bool,
}

/// A single quote with the requested expansions.
pub async fn quote_view(
    pool: &DbPool,
    quote: Quote,
    viewer: Option<DbId>,
    expand: QuoteExpansion,
) -> AppResult<QuoteView> {
    let contributor_id = quote.contributor_id;
    let mut view = QuoteView::new(quote, viewer);

    if expand.characters {
        let characters = characters_of(pool, view.id, view.character_ids()).await?;
        view = view.with_characters(characters);
    }

    if expand.contributor {
        let contributor = match contributor_id {
            Some(id) => UserRepo::find_by_id(pool, id)
                .await?
                .as_ref()
                .map(PublicUser::from),
            None => None,
        };
        view = view.with_contributor(contributor);
    }

    Ok(view)
}

// ---------------------------------------------------------------------------
// Search hits
// ---------------------------------------------------------------------------

/// Put re-fetched rows back in search rank order, dropping stale hits.
pub fn in_rank_order<T>(
    index: &'static str,
    hits: &SearchHits,
    rows: Vec<T>,
    id_of: impl Fn(&T) -> DbId,
) -> Vec<T> {
    let (ordered, missing) = order_by_ids(&hits.ids, rows, id_of);
    if !missing.is_empty() {
        tracing::warn!(index, ?missing, "Dropping search hits missing from the store");
    }
    ordered
}
