//! Read-only neighbor queries over the persisted similarity edges.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;

use sukta_core::model::{DeityId, HymnId, HymnVector, Namespace, SimilarityEdge, Vocabulary};
use sukta_core::schema::{Database, EdgeStats};

use crate::cache::NeighborCache;
use crate::error::SearchResult;
use crate::response::{Neighborhood, NeighborDetail, Summaries};

/// One neighbor of a queried hymn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub hymn_id: HymnId,
    pub similarity: f64,
}

impl From<(HymnId, f64)> for Neighbor {
    fn from((hymn_id, similarity): (HymnId, f64)) -> Self {
        Self {
            hymn_id,
            similarity,
        }
    }
}

/// Tuning for the query service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    /// Candidates drawn from the base namespace before diversity filtering.
    pub diverse_pool: usize,
    pub diverse_base: Namespace,
    /// Maximum memoized diverse results.
    pub cache_capacity: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            diverse_pool: 50,
            diverse_base: Namespace::Cosine,
            cache_capacity: 1024,
        }
    }
}

/// Neighbor queries against one database.
///
/// Construction checks that every stored vector belongs to the stored
/// vocabulary, so a half-finished rebuild is reported once at startup
/// rather than as odd results later. Diverse results are memoized for the
/// life of the service; restart it after a rebuild.
#[derive(Debug)]
pub struct NeighborService {
    db: Mutex<Database>,
    vocabulary: Vocabulary,
    options: QueryOptions,
    diverse: NeighborCache<(HymnId, usize), Vec<Neighbor>>,
}

impl NeighborService {
    pub fn new(db: Database, options: QueryOptions) -> SearchResult<Self> {
        let vocabulary = db.verify_vocabulary_consistency()?;
        log::info!(
            "Neighbor service ready: vocabulary {} with {} deities",
            vocabulary.generation(),
            vocabulary.len()
        );
        Ok(Self {
            db: Mutex::new(db),
            vocabulary,
            options,
            diverse: NeighborCache::new(options.cache_capacity),
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub const fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// The `k` most similar hymns in `namespace`, highest first. An unknown
    /// hymn has no neighbors.
    pub fn top_similar(
        &self,
        id: &HymnId,
        namespace: Namespace,
        k: usize,
    ) -> SearchResult<Vec<Neighbor>> {
        let rows = self.db.lock().top_neighbors(namespace, id, k)?;
        Ok(rows.into_iter().map(Neighbor::from).collect())
    }

    /// Up to `k` neighbors whose primary deities differ from one another.
    ///
    /// Candidates come from the base namespace in descending similarity.
    /// Each is taken if its primary deity is not yet represented; hymns
    /// without a primary deity never count as distinct. Remaining slots are
    /// backfilled with the best leftover candidates.
    pub fn diverse_top_similar(&self, id: &HymnId, k: usize) -> SearchResult<Vec<Neighbor>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        self.diverse
            .get_or_try_insert_with((id.clone(), k), || self.select_diverse(id, k))
    }

    fn select_diverse(&self, id: &HymnId, k: usize) -> SearchResult<Vec<Neighbor>> {
        let pool = self.options.diverse_pool.max(k);
        let (candidates, vectors) = {
            let db = self.db.lock();
            let candidates = db.top_neighbors(self.options.diverse_base, id, pool)?;
            let ids: Vec<HymnId> = candidates.iter().map(|(other, _)| other.clone()).collect();
            (candidates, db.get_hymn_vectors(&ids)?)
        };

        let deity_of = |hymn: &HymnId| -> Option<DeityId> {
            vectors
                .iter()
                .find(|v| &v.hymn_id == hymn)
                .and_then(|v| v.primary_deity_id)
        };

        Ok(pick_diverse(
            candidates
                .into_iter()
                .map(|(other, similarity)| {
                    let deity = deity_of(&other);
                    (Neighbor::from((other, similarity)), deity)
                })
                .collect(),
            k,
        ))
    }

    pub fn get_hymn_vector(&self, id: &HymnId) -> SearchResult<Option<HymnVector>> {
        Ok(self.db.lock().get_hymn_vector(id)?)
    }

    pub fn all_vectors(&self) -> SearchResult<Vec<HymnVector>> {
        Ok(self.db.lock().list_hymn_vectors()?)
    }

    /// The stored score of a pair, in either order.
    pub fn pair_similarity(
        &self,
        a: &HymnId,
        b: &HymnId,
        namespace: Namespace,
    ) -> SearchResult<Option<f64>> {
        Ok(self.db.lock().edge_similarity(namespace, a, b)?)
    }

    pub fn neighbors_above(
        &self,
        id: &HymnId,
        namespace: Namespace,
        min: f64,
    ) -> SearchResult<Vec<Neighbor>> {
        let rows = self.db.lock().neighbors_above(namespace, id, min)?;
        Ok(rows.into_iter().map(Neighbor::from).collect())
    }

    pub fn top_pairs(
        &self,
        namespace: Namespace,
        min: Option<f64>,
        limit: usize,
    ) -> SearchResult<Vec<SimilarityEdge>> {
        Ok(self.db.lock().top_edges(namespace, min, limit)?)
    }

    pub fn namespace_stats(&self, namespace: Namespace) -> SearchResult<EdgeStats> {
        Ok(self.db.lock().edge_stats(namespace)?)
    }

    /// The hymn, its diverse neighbors with full rows, and any summaries.
    ///
    /// Unlike the plain queries this requires the hymn to exist.
    pub fn neighborhood(
        &self,
        id: &HymnId,
        k: usize,
        summaries: &Summaries,
    ) -> SearchResult<Neighborhood> {
        let hymn = self
            .get_hymn_vector(id)?
            .ok_or_else(|| sukta_core::Error::NotFound {
                entity: "hymn",
                id: id.to_string(),
            })?;

        let neighbors = self.diverse_top_similar(id, k)?;
        let ids: Vec<HymnId> = neighbors.iter().map(|n| n.hymn_id.clone()).collect();
        let mut rows = self.db.lock().get_hymn_vectors(&ids)?;

        let details = neighbors
            .into_iter()
            .filter_map(|neighbor| {
                let index = rows.iter().position(|r| r.hymn_id == neighbor.hymn_id)?;
                let row = rows.swap_remove(index);
                Some(NeighborDetail {
                    primary_deity: self.deity_name(row.primary_deity_id),
                    summary: summaries.get(&row.hymn_id).map(str::to_string),
                    similarity: neighbor.similarity,
                    hymn: row,
                })
            })
            .collect();

        Ok(Neighborhood {
            primary_deity: self.deity_name(hymn.primary_deity_id),
            summary: summaries.get(&hymn.hymn_id).map(str::to_string),
            hymn,
            neighbors: details,
        })
    }

    fn deity_name(&self, id: Option<DeityId>) -> Option<String> {
        id.and_then(|id| self.vocabulary.by_id(id))
            .map(|term| term.name.clone())
    }
}

/// Greedy deity-diverse selection over candidates sorted by descending
/// similarity. Diverse picks come first, then backfill, each group in
/// candidate order.
fn pick_diverse(candidates: Vec<(Neighbor, Option<DeityId>)>, k: usize) -> Vec<Neighbor> {
    let mut chosen = Vec::with_capacity(k);
    let mut leftovers = Vec::new();
    let mut seen_deities = HashSet::new();
    let mut seen_hymns = HashSet::new();

    for (neighbor, deity) in candidates {
        if !seen_hymns.insert(neighbor.hymn_id.clone()) {
            continue;
        }
        match deity {
            Some(deity) if chosen.len() < k && seen_deities.insert(deity) => chosen.push(neighbor),
            _ => leftovers.push(neighbor),
        }
    }

    let missing = k.saturating_sub(chosen.len());
    chosen.extend(leftovers.into_iter().take(missing));
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: &str, similarity: f64) -> Neighbor {
        Neighbor {
            hymn_id: HymnId::from(id),
            similarity,
        }
    }

    fn ids(result: &[Neighbor]) -> Vec<&str> {
        result.iter().map(|n| n.hymn_id.as_str()).collect()
    }

    #[test]
    fn test_pick_diverse_prefers_new_deities() {
        let candidates = vec![
            (n("a", 0.9), Some(DeityId::new(0))),
            (n("b", 0.8), Some(DeityId::new(0))),
            (n("c", 0.7), Some(DeityId::new(1))),
            (n("d", 0.6), Some(DeityId::new(2))),
        ];
        assert_eq!(ids(&pick_diverse(candidates, 3)), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_pick_diverse_backfills_in_similarity_order() {
        let candidates = vec![
            (n("a", 0.9), Some(DeityId::new(0))),
            (n("b", 0.8), Some(DeityId::new(0))),
            (n("c", 0.7), None),
            (n("d", 0.6), Some(DeityId::new(0))),
        ];
        assert_eq!(ids(&pick_diverse(candidates, 3)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pick_diverse_returns_fewer_when_pool_is_small() {
        let candidates = vec![(n("a", 0.9), Some(DeityId::new(0)))];
        assert_eq!(pick_diverse(candidates, 4).len(), 1);
    }

    #[test]
    fn test_pick_diverse_never_duplicates() {
        let candidates = vec![
            (n("a", 0.9), Some(DeityId::new(0))),
            (n("a", 0.9), Some(DeityId::new(1))),
            (n("b", 0.5), Some(DeityId::new(1))),
        ];
        assert_eq!(ids(&pick_diverse(candidates, 4)), vec!["a", "b"]);
    }

    #[test]
    fn test_pick_diverse_respects_k() {
        let candidates = (0..10)
            .map(|i| (n(&i.to_string(), 1.0), Some(DeityId::new(i))))
            .collect();
        assert_eq!(pick_diverse(candidates, 4).len(), 4);
    }
}
