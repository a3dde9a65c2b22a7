use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::ids::HymnId;

/// One hymn of the corpus. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hymn {
    pub id: HymnId,
    pub book_number: u32,
    pub hymn_number: u32,
    pub title: String,
    pub text: String,
}

impl Hymn {
    /// Create a hymn whose id is its hymn number.
    #[must_use]
    pub fn new(
        book_number: u32,
        hymn_number: u32,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: HymnId::new(hymn_number.to_string()),
            book_number,
            hymn_number,
            title: title.into(),
            text: text.into(),
        }
    }

    /// Human-readable reference, e.g. `Book 1, Hymn 12`.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("Book {}, Hymn {}", self.book_number, self.hymn_number)
    }
}

/// An in-memory snapshot of the corpus, ordered by book then hymn number.
///
/// The order is significant: vocabulary tie-breaking follows it, so the same
/// corpus always yields the same vector positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    hymns: Vec<Hymn>,
}

impl Corpus {
    /// Build a corpus, sorting hymns and rejecting duplicate ids.
    pub fn new(mut hymns: Vec<Hymn>) -> Result<Self> {
        hymns.sort_by_key(|h| (h.book_number, h.hymn_number));

        let mut seen = HashSet::with_capacity(hymns.len());
        for hymn in &hymns {
            if !seen.insert(&hymn.id) {
                return Err(Error::InvalidData(format!(
                    "duplicate hymn id {} ({})",
                    hymn.id,
                    hymn.reference()
                )));
            }
        }

        Ok(Self { hymns })
    }

    #[must_use]
    pub fn hymns(&self) -> &[Hymn] {
        &self.hymns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hymns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hymns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hymn> {
        self.hymns.iter()
    }

    #[must_use]
    pub fn get(&self, id: &HymnId) -> Option<&Hymn> {
        self.hymns.iter().find(|h| &h.id == id)
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Hymn;
    type IntoIter = std::slice::Iter<'a, Hymn>;

    fn into_iter(self) -> Self::IntoIter {
        self.hymns.iter()
    }
}
