pub mod edge;
pub mod hymn;
pub mod ids;
pub mod metric;
pub mod vector;
pub mod vocabulary;

pub use edge::SimilarityEdge;
pub use hymn::{Corpus, Hymn};
pub use ids::{DeityId, HymnId};
pub use metric::{Metric, Namespace};
pub use vector::{DeityVector, HymnVector};
pub use vocabulary::{DeityTerm, Vocabulary};
