//! Response envelopes shared by several handler modules.

use serde::Serialize;

/// `{total, perPage, objects}` envelope for search-backed listings.
///
/// `total` is the search engine's hit count, not the number of objects on
/// this page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<T: Serialize> {
    pub total: u64,
    pub per_page: i64,
    pub objects: Vec<T>,
}

impl<T: Serialize> SearchPage<T> {
    pub fn empty(total: u64, per_page: i64) -> Self {
        Self {
            total,
            per_page,
            objects: Vec::new(),
        }
    }
}

/// `{exist}` answer of the existence checks.
#[derive(Debug, Serialize)]
pub struct ExistResponse {
    pub exist: bool,
}
