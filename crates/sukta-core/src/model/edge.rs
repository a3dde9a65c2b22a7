use serde::{Deserialize, Serialize};

use crate::model::ids::HymnId;

/// One stored similarity between two distinct hymns.
///
/// Edges are canonical: `hymn1 < hymn2`, so a pair has exactly one row per
/// namespace and never appears reversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub hymn1: HymnId,
    pub hymn2: HymnId,
    pub similarity: f64,
}

impl SimilarityEdge {
    /// Build a canonical edge from an unordered pair.
    ///
    /// Returns `None` for self-pairs and non-finite scores.
    #[must_use]
    pub fn canonical(a: HymnId, b: HymnId, similarity: f64) -> Option<Self> {
        if a == b || !similarity.is_finite() {
            return None;
        }
        let (hymn1, hymn2) = if a < b { (a, b) } else { (b, a) };
        Some(Self {
            hymn1,
            hymn2,
            similarity,
        })
    }

    /// The endpoint that is not `id`, if `id` is an endpoint at all.
    #[must_use]
    pub fn other(&self, id: &HymnId) -> Option<&HymnId> {
        if &self.hymn1 == id {
            Some(&self.hymn2)
        } else if &self.hymn2 == id {
            Some(&self.hymn1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_orders_pair() {
        let edge = SimilarityEdge::canonical("9".into(), "10".into(), 0.5).unwrap();
        assert_eq!(edge.hymn1.as_str(), "10");
        assert_eq!(edge.hymn2.as_str(), "9");
    }

    #[test]
    fn test_canonical_rejects_self_pair() {
        assert!(SimilarityEdge::canonical("3".into(), "3".into(), 1.0).is_none());
    }

    #[test]
    fn test_canonical_rejects_nan() {
        assert!(SimilarityEdge::canonical("1".into(), "2".into(), f64::NAN).is_none());
        assert!(SimilarityEdge::canonical("1".into(), "2".into(), f64::INFINITY).is_none());
    }

    #[test]
    fn test_other_endpoint() {
        let edge = SimilarityEdge::canonical("1".into(), "2".into(), 0.7).unwrap();
        assert_eq!(edge.other(&"1".into()).unwrap().as_str(), "2");
        assert_eq!(edge.other(&"2".into()).unwrap().as_str(), "1");
        assert!(edge.other(&"3".into()).is_none());
    }
}
