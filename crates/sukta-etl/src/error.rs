//! Error types for the batch builders.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a build step.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The corpus or an import file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An input file was not valid JSON of the expected shape.
    #[error("malformed input: {0}")]
    Format(#[from] serde_json::Error),

    /// An error propagated from the core domain layer.
    #[error(transparent)]
    Core(#[from] sukta_core::Error),

    /// No vocabulary has been stored yet.
    #[error("no vocabulary has been built; run `sukta vectorize` first")]
    MissingVocabulary,

    /// The configured fallback deity is not in the vocabulary.
    #[error("default deity '{0}' is not in the vocabulary")]
    UnknownDefaultDeity(String),

    /// The vocabulary outgrew the id space.
    #[error("vocabulary has {0} deities, more than a deity id can address")]
    VocabularyTooLarge(usize),

    #[error("invalid word pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl BuildError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for build results.
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Why a title yielded no deity signal. Never fatal: the vocabulary builder
/// logs these and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAnomaly {
    #[error("title has {0} tokens, expected at least 3")]
    TooShort(usize),

    #[error("title has {0} tokens and matches no known pattern")]
    Unrecognized(usize),
}
