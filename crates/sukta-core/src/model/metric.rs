//! Similarity metrics over binary deity vectors and the namespaces their
//! edges are stored under.
//!
//! All metrics are pure functions of two vectors and never return NaN or
//! infinity: degenerate inputs (zero norms, two empty sets) resolve to fixed
//! constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::model::vector::DeityVector;

/// A similarity metric computable from deity vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cosine,
    Jaccard,
    Dice,
    /// Count of differing positions. A distance, not a similarity.
    Hamming,
}

impl Metric {
    pub const ALL: [Self; 4] = [Self::Cosine, Self::Jaccard, Self::Dice, Self::Hamming];

    /// Score a pair of vectors.
    #[must_use]
    pub fn score(self, a: &DeityVector, b: &DeityVector) -> f64 {
        match self {
            Self::Cosine => cosine(a, b),
            Self::Jaccard => jaccard(a, b),
            Self::Dice => dice(a, b),
            Self::Hamming => f64::from(hamming(a, b)),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Jaccard => "jaccard",
            Self::Dice => "dice",
            Self::Hamming => "hamming",
        }
    }

    /// Whether larger scores mean *less* alike.
    #[must_use]
    pub const fn is_distance(self) -> bool {
        matches!(self, Self::Hamming)
    }

    /// The namespace this metric's edges are stored under.
    #[must_use]
    pub const fn namespace(self) -> Namespace {
        match self {
            Self::Cosine => Namespace::Cosine,
            Self::Jaccard => Namespace::Jaccard,
            Self::Dice => Namespace::Dice,
            Self::Hamming => Namespace::Hamming,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "unknown metric '{s}' (expected cosine, jaccard, dice or hamming)"
                ))
            })
    }
}

/// A named partition of the similarity edge store.
///
/// The four metric namespaces are derived from deity vectors and are
/// invalidated by a vocabulary rebuild. `Semantic` is filled by an external
/// producer and only shares the storage contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Cosine,
    Jaccard,
    Dice,
    Hamming,
    Semantic,
}

impl Namespace {
    pub const ALL: [Self; 5] = [
        Self::Cosine,
        Self::Jaccard,
        Self::Dice,
        Self::Hamming,
        Self::Semantic,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Jaccard => "jaccard",
            Self::Dice => "dice",
            Self::Hamming => "hamming",
            Self::Semantic => "semantic",
        }
    }

    /// SQL table holding this namespace's edges.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Cosine => "hymn_similarities_cosine",
            Self::Jaccard => "hymn_similarities_jaccard",
            Self::Dice => "hymn_similarities_dice",
            Self::Hamming => "hymn_similarities_hamming",
            Self::Semantic => "hymn_similarities_semantic",
        }
    }

    #[must_use]
    pub const fn metric(self) -> Option<Metric> {
        match self {
            Self::Cosine => Some(Metric::Cosine),
            Self::Jaccard => Some(Metric::Jaccard),
            Self::Dice => Some(Metric::Dice),
            Self::Hamming => Some(Metric::Hamming),
            Self::Semantic => None,
        }
    }

    /// Whether edges in this namespace were computed from deity vectors.
    #[must_use]
    pub const fn depends_on_vocabulary(self) -> bool {
        self.metric().is_some()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|n| n.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "unknown namespace '{s}' (expected cosine, jaccard, dice, hamming or semantic)"
                ))
            })
    }
}

impl From<Metric> for Namespace {
    fn from(metric: Metric) -> Self {
        metric.namespace()
    }
}

/// `|A∩B| / sqrt(|A|·|B|)`, the cosine of two binary vectors; 0.0 when
/// either vector is all-zero.
#[must_use]
pub fn cosine(a: &DeityVector, b: &DeityVector) -> f64 {
    let na = u64::from(a.count_ones());
    let nb = u64::from(b.count_ones());
    if na == 0 || nb == 0 {
        return 0.0;
    }
    // The product is exact for any realistic vocabulary size, so sqrt(n·n)
    // returns n exactly and identical vectors score exactly 1.0.
    #[allow(clippy::cast_precision_loss)]
    let norm = ((na * nb) as f64).sqrt();
    f64::from(a.intersection_count(b)) / norm
}

/// `|A∩B| / |A∪B|`; 1.0 when both are empty.
#[must_use]
pub fn jaccard(a: &DeityVector, b: &DeityVector) -> f64 {
    if a.is_zero() && b.is_zero() {
        return 1.0;
    }
    let union = a.union_count(b);
    if union == 0 {
        return 0.0;
    }
    f64::from(a.intersection_count(b)) / f64::from(union)
}

/// `2|A∩B| / (|A|+|B|)`; 1.0 when both are empty.
#[must_use]
pub fn dice(a: &DeityVector, b: &DeityVector) -> f64 {
    let total = a.count_ones() + b.count_ones();
    if total == 0 {
        return 1.0;
    }
    2.0 * f64::from(a.intersection_count(b)) / f64::from(total)
}

/// Number of differing positions.
#[must_use]
pub fn hamming(a: &DeityVector, b: &DeityVector) -> u32 {
    a.hamming(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(bits: &[u8]) -> DeityVector {
        DeityVector::from_bits(bits).unwrap()
    }

    #[test]
    fn test_cosine_self_is_one() {
        for bits in [&[1, 0, 0][..], &[1, 1, 0], &[1, 1, 1], &[0, 1, 1, 1, 1, 1, 1]] {
            let a = v(bits);
            assert_eq!(cosine(&a, &a), 1.0);
        }
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let zero = v(&[0, 0, 0]);
        assert_eq!(cosine(&zero, &zero), 0.0);
        assert_eq!(cosine(&zero, &v(&[1, 0, 0])), 0.0);
    }

    #[test]
    fn test_cosine_partial_overlap() {
        let a = v(&[1, 1, 0, 0]);
        let b = v(&[1, 0, 1, 0]);
        assert!((cosine(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_identical_vectors_score_one_on_every_similarity() {
        let a = v(&[1, 0, 1, 1, 0]);
        let b = a.clone();
        assert_eq!(Metric::Cosine.score(&a, &b), 1.0);
        assert_eq!(Metric::Jaccard.score(&a, &b), 1.0);
        assert_eq!(Metric::Dice.score(&a, &b), 1.0);
        assert_eq!(Metric::Hamming.score(&a, &b), 0.0);
    }

    #[test]
    fn test_both_empty_conventions() {
        let zero = v(&[0, 0, 0, 0]);
        assert_eq!(jaccard(&zero, &zero), 1.0);
        assert_eq!(dice(&zero, &zero), 1.0);
        assert_eq!(hamming(&zero, &zero), 0);
    }

    #[test]
    fn test_disjoint_support_scores_zero() {
        let a = v(&[1, 1, 0, 0]);
        let b = v(&[0, 0, 1, 0]);
        assert_eq!(jaccard(&a, &b), 0.0);
        assert_eq!(dice(&a, &b), 0.0);
        assert_eq!(cosine(&a, &b), 0.0);
        assert_eq!(hamming(&a, &b), 3);
    }

    #[test]
    fn test_metrics_are_symmetric() {
        let a = v(&[1, 0, 1, 1, 0, 1, 0, 0]);
        let b = v(&[0, 0, 1, 1, 1, 0, 0, 1]);
        for metric in Metric::ALL {
            assert_eq!(metric.score(&a, &b), metric.score(&b, &a), "{metric}");
        }
    }

    #[test]
    fn test_jaccard_and_dice_values() {
        let a = v(&[1, 1, 1, 0]);
        let b = v(&[0, 1, 1, 1]);
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-12);
        assert!((dice(&a, &b) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_scores_are_finite() {
        let zero = v(&[0, 0]);
        let one = v(&[1, 0]);
        for metric in Metric::ALL {
            assert!(metric.score(&zero, &zero).is_finite());
            assert!(metric.score(&zero, &one).is_finite());
        }
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("cosine".parse::<Metric>().unwrap(), Metric::Cosine);
        assert_eq!("Jaccard".parse::<Metric>().unwrap(), Metric::Jaccard);
        assert!("semantic".parse::<Metric>().is_err());
    }

    #[test]
    fn test_namespace_from_str_and_metric() {
        let ns: Namespace = "semantic".parse().unwrap();
        assert_eq!(ns, Namespace::Semantic);
        assert!(ns.metric().is_none());
        assert!(!ns.depends_on_vocabulary());
        assert_eq!(Namespace::from(Metric::Dice), Namespace::Dice);
        assert_eq!(Namespace::Dice.table(), "hymn_similarities_dice");
    }
}
