//! Batch builders for sukta.
//!
//! Turns the raw hymn corpus into a deity vocabulary, binary hymn vectors,
//! primary-deity assignments and per-metric similarity edges. Each pass is
//! available as a plain job ([`jobs`]) and as a treadle `Stage`.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod assign;
pub mod config;
pub mod corpus;
pub mod error;
pub mod jobs;
pub mod normalize;
pub mod pipeline;
pub mod recount;
pub mod semantic;
pub mod similarity;
pub mod stages;
pub mod vectorize;
pub mod vocabulary;
pub mod work_item;

pub use config::Config;
pub use error::{BuildError, BuildResult, ParseAnomaly};
pub use pipeline::{build_pipeline, ensure_complete};
pub use stages::{AssignStage, SimilarityStage, VectorizeStage};
pub use work_item::BuildJob;
