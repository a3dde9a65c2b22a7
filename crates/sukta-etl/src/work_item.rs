use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use treadle::WorkItem;

/// One full rebuild of the store from a corpus file.
///
/// This is the treadle `WorkItem` that flows through the vectorize →
/// assign → similarity stages. Treadle remembers completed stages per item
/// id, so every rebuild needs a fresh id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildJob {
    id: String,
    /// Raw corpus JSON the rebuild reads.
    pub corpus_path: PathBuf,
}

impl BuildJob {
    #[must_use]
    pub fn new(id: impl Into<String>, corpus_path: PathBuf) -> Self {
        Self {
            id: id.into(),
            corpus_path,
        }
    }

    /// A job with a random id, for a rebuild that must run every stage.
    #[must_use]
    pub fn fresh(corpus_path: PathBuf) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), corpus_path)
    }
}

impl WorkItem for BuildJob {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for BuildJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.corpus_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_job_creation() {
        let job = BuildJob::new("test-id", PathBuf::from("/data/rigveda.json"));
        assert_eq!(job.id(), "test-id");
        assert_eq!(job.corpus_path, PathBuf::from("/data/rigveda.json"));
    }

    #[test]
    fn test_fresh_jobs_have_distinct_ids() {
        let a = BuildJob::fresh(PathBuf::from("/data/rigveda.json"));
        let b = BuildJob::fresh(PathBuf::from("/data/rigveda.json"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_build_job_display() {
        let job = BuildJob::new("test-id", PathBuf::from("/data/rigveda.json"));
        assert!(format!("{job}").contains("rigveda.json"));
    }
}
