use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Stored vectors were built against a different vocabulary generation
    /// than the one currently persisted.
    #[error("vocabulary version mismatch: expected {expected}, found {found}")]
    VocabularyVersionMismatch { expected: String, found: String },
}

impl Error {
    /// Returns `true` when the error reports a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn hymn_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "hymn",
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
