use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a hymn.
///
/// Hymn ids are numeric strings, but ordering is lexicographic: similarity
/// edges are canonicalized on this ordering, so `"10" < "9"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HymnId(String);

impl HymnId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HymnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HymnId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HymnId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for HymnId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a deity in the vocabulary.
///
/// A deity's id equals its vector position within one vocabulary generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeityId(u32);

impl DeityId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The vector index this id addresses.
    #[must_use]
    pub const fn position(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
