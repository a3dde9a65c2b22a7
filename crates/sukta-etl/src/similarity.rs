//! All-pairs similarity over hymn vectors.
//!
//! Every unordered pair `i < j` is scored exactly once. Rows are sharded
//! across the rayon pool; each shard owns a disjoint set of `i` and the
//! metrics are pure, so shards share nothing until the final collect.

use rayon::prelude::*;
use serde::Serialize;

use sukta_core::model::{HymnVector, Metric, SimilarityEdge};

/// Result of one similarity pass.
#[derive(Debug, Clone)]
pub struct SimilarityRun {
    pub metric: Metric,
    pub min_similarity: Option<f64>,
    pub pairs_scored: usize,
    pub edges: Vec<SimilarityEdge>,
}

impl SimilarityRun {
    /// The `k` highest-scoring edges, for reporting.
    #[must_use]
    pub fn top(&self, k: usize) -> Vec<&SimilarityEdge> {
        let mut sorted: Vec<&SimilarityEdge> = self.edges.iter().collect();
        sorted.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        sorted.truncate(k);
        sorted
    }

    #[must_use]
    pub fn summary(&self) -> SimilaritySummary {
        SimilaritySummary {
            metric: self.metric,
            min_similarity: self.min_similarity,
            pairs_scored: self.pairs_scored,
            edges_kept: self.edges.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilaritySummary {
    pub metric: Metric,
    pub min_similarity: Option<f64>,
    pub pairs_scored: usize,
    pub edges_kept: usize,
}

/// Score every pair of `vectors` with `metric`, keeping those that meet or
/// exceed `min_similarity`.
///
/// Edges come back canonical (`hymn1 < hymn2`) and in row order, so the
/// output is deterministic regardless of thread count.
#[must_use]
pub fn compute_similarities(
    vectors: &[HymnVector],
    metric: Metric,
    min_similarity: Option<f64>,
) -> SimilarityRun {
    let n = vectors.len();
    let edges: Vec<SimilarityEdge> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let a = &vectors[i];
            vectors[i + 1..].iter().filter_map(move |b| {
                let score = metric.score(&a.vector, &b.vector);
                if min_similarity.is_some_and(|min| score < min) {
                    return None;
                }
                SimilarityEdge::canonical(a.hymn_id.clone(), b.hymn_id.clone(), score)
            })
        })
        .collect();

    let pairs_scored = n * n.saturating_sub(1) / 2;
    log::info!(
        "Scored {} pairs with {}, kept {} edges",
        pairs_scored,
        metric,
        edges.len()
    );

    SimilarityRun {
        metric,
        min_similarity,
        pairs_scored,
        edges,
    }
}
