//! Graph views of sukta's stored data.
//!
//! Projects a similarity namespace into an undirected hymn graph and the
//! hymn vectors into a weighted deity co-occurrence graph, both on petgraph.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod cooccurrence;
pub mod similarity;

pub use cooccurrence::{CooccurrenceEdge, DeityCooccurrence};
pub use similarity::{Centrality, SimilarityGraph};
