//! The deity vocabulary: an immutable, versioned mapping from deity name to
//! vector position.
//!
//! A [`Vocabulary`] is built once per corpus generation and handed by
//! reference to every component that reads or writes deity vectors. Its
//! `generation` string identifies the build; vectors record the generation
//! they were produced against so that mixing generations can be detected.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::ids::DeityId;

/// One deity in the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeityTerm {
    pub id: DeityId,
    /// Normalized lowercase name, diacritics preserved.
    pub name: String,
    pub position: usize,
    /// Reference count: titles mentioning the deity, or corpus mentions after
    /// a recount.
    pub frequency: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    generation: String,
    terms: Vec<DeityTerm>,
    by_name: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from terms ordered by position.
    ///
    /// Positions must be exactly `0..terms.len()` in order, ids must equal
    /// positions, and names must be unique.
    pub fn new(generation: impl Into<String>, terms: Vec<DeityTerm>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(terms.len());
        for (index, term) in terms.iter().enumerate() {
            if term.position != index || term.id.position() != index {
                return Err(Error::InvalidData(format!(
                    "deity '{}' has position {} and id {} at index {index}",
                    term.name, term.position, term.id
                )));
            }
            if by_name.insert(term.name.clone(), index).is_some() {
                return Err(Error::InvalidData(format!(
                    "duplicate deity name '{}'",
                    term.name
                )));
            }
        }

        Ok(Self {
            generation: generation.into(),
            terms,
            by_name,
        })
    }

    #[must_use]
    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// Vocabulary size, i.e. the deity vector length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn terms(&self) -> &[DeityTerm] {
        &self.terms
    }

    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DeityTerm> {
        self.position_of(name).map(|i| &self.terms[i])
    }

    #[must_use]
    pub fn by_id(&self, id: DeityId) -> Option<&DeityTerm> {
        self.terms.get(id.position())
    }

    #[must_use]
    pub fn frequency(&self, name: &str) -> Option<u64> {
        self.get(name).map(|t| t.frequency)
    }

    /// Replace frequencies for the named deities. Unknown names are ignored.
    pub fn set_frequencies<'a>(&mut self, updates: impl IntoIterator<Item = (&'a str, u64)>) {
        for (name, frequency) in updates {
            if let Some(&i) = self.by_name.get(name) {
                self.terms[i].frequency = frequency;
            }
        }
    }
}
