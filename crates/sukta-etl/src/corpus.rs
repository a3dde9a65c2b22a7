//! Reading the raw corpus JSON produced by the scraper.
//!
//! The expected shape is
//! `{ "books": { "<n>": { "book_number": n, "hymns": { "<m>": { "hymn_number": m, "title": "...", "text": "..." } } } } }`.
//! Map keys are ignored; numbers inside each object are authoritative.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use sukta_core::model::{Corpus, Hymn};

use crate::error::{BuildError, BuildResult};

#[derive(Debug, Deserialize)]
struct RawCorpus {
    books: BTreeMap<String, RawBook>,
}

#[derive(Debug, Deserialize)]
struct RawBook {
    book_number: u32,
    #[serde(default)]
    hymns: BTreeMap<String, RawHymn>,
}

#[derive(Debug, Deserialize)]
struct RawHymn {
    hymn_number: u32,
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
}

/// Parse a corpus from its JSON text.
pub fn parse_corpus(json: &str) -> BuildResult<Corpus> {
    let raw: RawCorpus = serde_json::from_str(json)?;
    let hymns = raw
        .books
        .into_values()
        .flat_map(|book| {
            let book_number = book.book_number;
            book.hymns
                .into_values()
                .map(move |h| Hymn::new(book_number, h.hymn_number, h.title, h.text))
        })
        .collect();
    Ok(Corpus::new(hymns)?)
}

/// Read and parse a corpus file.
pub fn load_corpus(path: &Path) -> BuildResult<Corpus> {
    let json = std::fs::read_to_string(path).map_err(|e| BuildError::read(path, e))?;
    let corpus = parse_corpus(&json)?;
    log::info!("Loaded {} hymns from {}", corpus.len(), path.display());
    Ok(corpus)
}
