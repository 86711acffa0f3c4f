use meilisearch_sdk::errors::Error as MeiliError;

/// Failures talking to the search engine.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search engine error: {0}")]
    Meili(#[from] MeiliError),

    #[error("search request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("settings task for index '{index}' did not succeed")]
    SettingsRejected { index: &'static str },
}

impl SearchError {
    /// Whether retrying the same request could succeed.
    ///
    /// Errors reported by the engine itself (bad filter, missing index, ...)
    /// are deterministic; transport failures and timeouts are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Meili(MeiliError::Meilisearch(_)) => false,
            Self::Meili(_) => true,
            Self::SettingsRejected { .. } => false,
        }
    }
}
