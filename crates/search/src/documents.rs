//! Index schema and the slim documents pushed to each index.
//!
//! Documents carry only what ranking, filtering and sorting need. Full
//! entities always come from Postgres.

use meilisearch_sdk::settings::Settings;
use quotedex_core::types::{DbId, Timestamp};
use quotedex_db::models::character::Character;
use quotedex_db::models::quote::Quote;
use quotedex_db::models::source::Source;
use serde::Serialize;

pub const CHARACTER_INDEX: &str = "characters";
pub const QUOTE_INDEX: &str = "quotes";
pub const SOURCE_INDEX: &str = "sources";

/// Primary key attribute shared by every index.
pub const PRIMARY_KEY: &str = "id";

pub const FIELD_CONTRIBUTOR_ID: &str = "contributorId";
pub const FIELD_CREATED_AT: &str = "createdAt";
pub const FIELD_QUOTES_COUNT: &str = "quotesCount";

/// `sort` first: an explicit sort key outranks textual relevance.
const RANKING_RULES: [&str; 6] = ["sort", "words", "typo", "proximity", "attribute", "exactness"];

/// Static description of one index.
#[derive(Debug, Clone, Copy)]
pub struct IndexSchema {
    pub name: &'static str,
    pub searchable: &'static [&'static str],
    pub filterable: &'static [&'static str],
    pub sortable: &'static [&'static str],
}

impl IndexSchema {
    pub fn settings(&self) -> Settings {
        Settings::new()
            .with_ranking_rules(RANKING_RULES)
            .with_searchable_attributes(self.searchable)
            .with_filterable_attributes(self.filterable)
            .with_sortable_attributes(self.sortable)
    }
}

pub const SCHEMAS: [IndexSchema; 3] = [
    IndexSchema {
        name: CHARACTER_INDEX,
        searchable: &["name", "alias"],
        filterable: &[FIELD_CONTRIBUTOR_ID, "sourceId"],
        sortable: &[FIELD_QUOTES_COUNT, FIELD_CREATED_AT],
    },
    IndexSchema {
        name: QUOTE_INDEX,
        searchable: &["quote"],
        filterable: &[FIELD_CONTRIBUTOR_ID, "characterIds"],
        sortable: &[FIELD_CREATED_AT],
    },
    IndexSchema {
        name: SOURCE_INDEX,
        searchable: &["name", "alias", "info"],
        filterable: &[FIELD_CONTRIBUTOR_ID],
        sortable: &[FIELD_CREATED_AT],
    },
];

/// Sort keys are stored as unix milliseconds.
fn sort_key(ts: Timestamp) -> i64 {
    ts.timestamp_millis()
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDocument {
    pub id: DbId,
    pub name: String,
    pub alias: Vec<String>,
    pub source_id: DbId,
    pub contributor_id: Option<DbId>,
    pub quotes_count: i32,
    pub created_at: i64,
}

impl From<&Character> for CharacterDocument {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            alias: character.alias.clone(),
            source_id: character.source_id,
            contributor_id: character.contributor_id,
            quotes_count: character.quotes_count,
            created_at: sort_key(character.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocument {
    pub id: DbId,
    pub quote: String,
    pub character_ids: Vec<DbId>,
    pub contributor_id: Option<DbId>,
    pub created_at: i64,
}

impl From<&Quote> for QuoteDocument {
    fn from(quote: &Quote) -> Self {
        Self {
            id: quote.id,
            quote: quote.quote.clone(),
            character_ids: quote.character_ids.clone(),
            contributor_id: quote.contributor_id,
            created_at: sort_key(quote.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    pub id: DbId,
    pub name: String,
    pub alias: Vec<String>,
    pub info: String,
    pub contributor_id: Option<DbId>,
    pub created_at: i64,
}

impl From<&Source> for SourceDocument {
    fn from(source: &Source) -> Self {
        Self {
            id: source.id,
            name: source.name.clone(),
            alias: source.alias.clone(),
            info: source.info.clone(),
            contributor_id: source.contributor_id,
            created_at: sort_key(source.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn character() -> Character {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Character {
            id: 7,
            source_id: 3,
            name: "Paul".into(),
            alias: vec!["Muad'Dib".into()],
            info: "Duke".into(),
            avatar: "paul.png".into(),
            contributor_id: Some(11),
            quotes_count: 4,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn character_document_uses_camel_case_sort_keys() {
        let doc = CharacterDocument::from(&character());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["quotesCount"], 4);
        assert_eq!(json["contributorId"], 11);
        assert_eq!(json["sourceId"], 3);
        assert_eq!(json["createdAt"], 1_717_243_200_000_i64);
        assert!(json.get("info").is_none());
        assert!(json.get("avatar").is_none());
    }

    #[test]
    fn every_schema_ranks_sort_first() {
        for schema in SCHEMAS {
            assert!(schema.filterable.contains(&FIELD_CONTRIBUTOR_ID), "{}", schema.name);
            assert!(schema.sortable.contains(&FIELD_CREATED_AT), "{}", schema.name);
        }
        assert_eq!(RANKING_RULES[0], "sort");
    }
}
