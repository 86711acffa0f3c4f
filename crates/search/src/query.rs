//! Shaping of the four search-backed listings into engine requests.
//!
//! Kept free of I/O so the filters, sort keys and windows can be unit tested.

use quotedex_core::pagination::PageRequest;
use quotedex_core::types::DbId;

use crate::documents::{
    CHARACTER_INDEX, FIELD_CONTRIBUTOR_ID, FIELD_CREATED_AT, FIELD_QUOTES_COUNT, QUOTE_INDEX,
    SOURCE_INDEX,
};

/// One ranked id lookup against a single index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub index: &'static str,
    pub query: Option<String>,
    pub filter: Option<String>,
    pub sort: Vec<String>,
    pub offset: usize,
    pub limit: usize,
}

impl SearchRequest {
    fn new(index: &'static str, page: PageRequest) -> Self {
        Self {
            index,
            query: None,
            filter: None,
            sort: Vec::new(),
            offset: usize::try_from(page.offset()).unwrap_or(0),
            limit: usize::try_from(page.limit()).unwrap_or(0),
        }
    }

    /// Name/alias match, most-quoted characters first.
    pub fn characters_by_keyword(keyword: &str, page: PageRequest) -> Self {
        Self {
            query: Some(keyword.to_string()),
            sort: vec![format!("{FIELD_QUOTES_COUNT}:desc")],
            ..Self::new(CHARACTER_INDEX, page)
        }
    }

    /// A contributor's characters, newest first.
    pub fn characters_by_contributor(contributor_id: DbId, page: PageRequest) -> Self {
        Self {
            filter: Some(contributor_filter(contributor_id)),
            sort: vec![format!("{FIELD_CREATED_AT}:desc")],
            ..Self::new(CHARACTER_INDEX, page)
        }
    }

    /// A contributor's quotes, oldest first.
    pub fn quotes_by_contributor(contributor_id: DbId, page: PageRequest) -> Self {
        Self {
            filter: Some(contributor_filter(contributor_id)),
            sort: vec![format!("{FIELD_CREATED_AT}:asc")],
            ..Self::new(QUOTE_INDEX, page)
        }
    }

    /// Name/alias/info match, by relevance.
    pub fn sources_by_keyword(keyword: &str, page: PageRequest) -> Self {
        Self {
            query: Some(keyword.to_string()),
            ..Self::new(SOURCE_INDEX, page)
        }
    }

    pub fn sort_refs(&self) -> Vec<&str> {
        self.sort.iter().map(String::as_str).collect()
    }
}

/// Equality filter on the contributor. Ids are integers, so no quoting.
pub fn contributor_filter(contributor_id: DbId) -> String {
    format!("{FIELD_CONTRIBUTOR_ID} = {contributor_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: i64, per_page: i64) -> PageRequest {
        PageRequest::new(Some(page), Some(per_page), 20, 100)
    }

    #[test]
    fn keyword_window_starts_at_page_offset() {
        let req = SearchRequest::characters_by_keyword("paul", page(3, 10));
        assert_eq!(req.index, "characters");
        assert_eq!(req.query.as_deref(), Some("paul"));
        assert_eq!(req.offset, 20);
        assert_eq!(req.limit, 10);
        assert_eq!(req.sort, vec!["quotesCount:desc".to_string()]);
        assert!(req.filter.is_none());
    }

    #[test]
    fn contributor_listings_filter_and_sort() {
        let chars = SearchRequest::characters_by_contributor(42, page(1, 20));
        assert_eq!(chars.filter.as_deref(), Some("contributorId = 42"));
        assert_eq!(chars.sort_refs(), vec!["createdAt:desc"]);
        assert!(chars.query.is_none());

        let quotes = SearchRequest::quotes_by_contributor(42, page(1, 20));
        assert_eq!(quotes.index, "quotes");
        assert_eq!(quotes.sort_refs(), vec!["createdAt:asc"]);
    }

    #[test]
    fn source_search_has_no_sort() {
        let req = SearchRequest::sources_by_keyword("dune", page(1, 5));
        assert_eq!(req.index, "sources");
        assert!(req.sort.is_empty());
        assert_eq!(req.offset, 0);
    }
}
