//! Importing externally computed semantic similarities.
//!
//! The producer is opaque; only its output shape matters:
//! `[{ "hymn1_id": "1", "hymn2_id": "2", "similarity": 0.83 }, ...]`.
//! Ids may be strings or integers.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use sukta_core::model::{HymnId, SimilarityEdge};

use crate::error::{BuildError, BuildResult};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for HymnId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => Self::new(s),
            RawId::Number(n) => Self::new(n.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    hymn1_id: RawId,
    hymn2_id: RawId,
    similarity: f64,
}

#[derive(Debug, Clone)]
pub struct SemanticImport {
    pub edges: Vec<SimilarityEdge>,
    /// Self-pairs and non-finite scores.
    pub rejected: usize,
    /// Repeats of a pair already seen, in either order. First one wins.
    pub duplicates: usize,
}

/// Parse and canonicalize a semantic similarity table.
pub fn parse_semantic_edges(json: &str) -> BuildResult<SemanticImport> {
    let raw: Vec<RawEdge> = serde_json::from_str(json)?;

    let mut pairs: BTreeMap<(HymnId, HymnId), f64> = BTreeMap::new();
    let mut rejected = 0;
    let mut duplicates = 0;
    for record in raw {
        let Some(edge) =
            SimilarityEdge::canonical(record.hymn1_id.into(), record.hymn2_id.into(), record.similarity)
        else {
            rejected += 1;
            continue;
        };
        match pairs.entry((edge.hymn1, edge.hymn2)) {
            std::collections::btree_map::Entry::Occupied(_) => duplicates += 1,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(edge.similarity);
            }
        }
    }

    if rejected > 0 || duplicates > 0 {
        log::warn!(
            "Semantic import dropped {} invalid and {} duplicate pairs",
            rejected,
            duplicates
        );
    }

    let edges = pairs
        .into_iter()
        .map(|((hymn1, hymn2), similarity)| SimilarityEdge {
            hymn1,
            hymn2,
            similarity,
        })
        .collect();

    Ok(SemanticImport {
        edges,
        rejected,
        duplicates,
    })
}

pub fn load_semantic_edges(path: &Path) -> BuildResult<SemanticImport> {
    let json = std::fs::read_to_string(path).map_err(|e| BuildError::read(path, e))?;
    parse_semantic_edges(&json)
}
