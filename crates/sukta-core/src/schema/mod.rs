mod db;
mod migrations;

pub use db::{Database, DeityShare, EdgeStats, VectorStats, VocabularyInfo, BUCKET_BOUNDS};
pub use migrations::{Migration, MIGRATIONS};
