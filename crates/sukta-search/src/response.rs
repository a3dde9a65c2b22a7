//! Response shapes for the serving layer.

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use sukta_core::model::{HymnId, HymnVector};

use crate::error::{SearchError, SearchResult};

/// Optional one-paragraph hymn summaries, keyed by hymn id.
#[derive(Debug, Clone, Default)]
pub struct Summaries {
    by_hymn: HashMap<String, String>,
}

impl Summaries {
    /// Read a `{ "<hymn_id>": "summary" }` JSON file.
    pub fn load(path: &Path) -> SearchResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| SearchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let summaries = Self::from_json(&json)?;
        log::info!("Loaded {} summaries from {}", summaries.len(), path.display());
        Ok(summaries)
    }

    /// Load from `path` when given, otherwise no summaries.
    pub fn load_optional(path: Option<&Path>) -> SearchResult<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn from_json(json: &str) -> SearchResult<Self> {
        Ok(Self {
            by_hymn: serde_json::from_str(json)?,
        })
    }

    pub fn get(&self, id: &HymnId) -> Option<&str> {
        self.by_hymn.get(id.as_str()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_hymn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hymn.is_empty()
    }
}

/// A hymn with its diverse neighbors, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct Neighborhood {
    pub hymn: HymnVector,
    pub primary_deity: Option<String>,
    pub summary: Option<String>,
    pub neighbors: Vec<NeighborDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NeighborDetail {
    pub hymn: HymnVector,
    pub similarity: f64,
    pub primary_deity: Option<String>,
    pub summary: Option<String>,
}
