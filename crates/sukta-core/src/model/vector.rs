//! Fixed-length binary deity vectors.
//!
//! A [`DeityVector`] stores one bit per vocabulary position, packed into
//! 64-bit blocks so that set intersections and Hamming distances reduce to
//! popcounts. On the storage boundary it round-trips as a JSON array of 0/1.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::ids::{DeityId, HymnId};

const BLOCK_BITS: usize = 64;

/// A binary presence vector over the deity vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", try_from = "Vec<u8>")]
pub struct DeityVector {
    len: usize,
    blocks: Vec<u64>,
}

impl DeityVector {
    /// An all-zero vector of the given length.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            blocks: vec![0; len.div_ceil(BLOCK_BITS)],
        }
    }

    /// Build a vector from a slice of 0/1 values.
    pub fn from_bits(bits: &[u8]) -> Result<Self, Error> {
        let mut vector = Self::zeros(bits.len());
        for (i, &bit) in bits.iter().enumerate() {
            match bit {
                0 => {}
                1 => vector.set(i),
                other => {
                    return Err(Error::InvalidData(format!(
                        "deity vector element {i} is {other}, expected 0 or 1"
                    )))
                }
            }
        }
        Ok(vector)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set the bit at `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize) {
        if index < self.len {
            self.blocks[index / BLOCK_BITS] |= 1u64 << (index % BLOCK_BITS);
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        index < self.len && self.blocks[index / BLOCK_BITS] & (1u64 << (index % BLOCK_BITS)) != 0
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> u32 {
        self.blocks.iter().map(|b| b.count_ones()).sum()
    }

    /// Whether no bit is set.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.blocks.iter().all(|&b| b == 0)
    }

    /// `|A ∩ B|`.
    #[must_use]
    pub fn intersection_count(&self, other: &Self) -> u32 {
        self.blocks
            .iter()
            .zip(&other.blocks)
            .map(|(a, b)| (a & b).count_ones())
            .sum()
    }

    /// `|A ∪ B|`.
    #[must_use]
    pub fn union_count(&self, other: &Self) -> u32 {
        self.count_ones() + other.count_ones() - self.intersection_count(other)
    }

    /// Number of positions where the two vectors differ.
    ///
    /// Vectors of different lengths count every position past the shorter
    /// one that is set in the longer one.
    #[must_use]
    pub fn hamming(&self, other: &Self) -> u32 {
        let (short, long) = if self.blocks.len() <= other.blocks.len() {
            (self, other)
        } else {
            (other, self)
        };
        let shared: u32 = short
            .blocks
            .iter()
            .zip(&long.blocks)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        let tail: u32 = long.blocks[short.blocks.len()..]
            .iter()
            .map(|b| b.count_ones())
            .sum();
        shared + tail
    }

    /// Indices of set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&i| self.get(i))
    }

    /// Expand to one byte per position.
    #[must_use]
    pub fn to_bits(&self) -> Vec<u8> {
        (0..self.len).map(|i| u8::from(self.get(i))).collect()
    }
}

impl From<DeityVector> for Vec<u8> {
    fn from(vector: DeityVector) -> Self {
        vector.to_bits()
    }
}

impl TryFrom<Vec<u8>> for DeityVector {
    type Error = Error;

    fn try_from(bits: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_bits(&bits)
    }
}

/// A hymn's row in the vector table: the vector plus its derived attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HymnVector {
    pub hymn_id: HymnId,
    pub book_number: u32,
    pub hymn_number: u32,
    pub title: String,
    pub vector: DeityVector,
    /// Matched deity names in vocabulary order.
    pub deity_names: Vec<String>,
    pub deity_count: u32,
    /// Sum of the corpus frequencies of the matched deities.
    pub hymn_score: f64,
    pub primary_deity_id: Option<DeityId>,
    pub word_count: u32,
}
