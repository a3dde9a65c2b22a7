use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Core(#[from] sukta_core::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed summaries: {0}")]
    Format(#[from] serde_json::Error),
}

impl SearchError {
    /// Returns `true` when the query named a hymn that is not stored.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_not_found())
    }
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;
