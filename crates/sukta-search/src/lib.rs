//! Neighbor queries for sukta.
//!
//! Serves top-K and deity-diverse top-K neighbors, vector reads, pair
//! lookups and namespace statistics from the edges built by `sukta-etl`.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod cache;
pub mod error;
pub mod response;
pub mod service;

pub use cache::NeighborCache;
pub use error::{SearchError, SearchResult};
pub use response::{NeighborDetail, Neighborhood, Summaries};
pub use service::{Neighbor, NeighborService, QueryOptions};
