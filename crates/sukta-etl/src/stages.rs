//! Treadle stages wrapping the batch jobs.
//!
//! Stages open their own database connection per execution and record a
//! JSON summary of their job in the stage context metadata.

use serde::Serialize;
use std::path::{Path, PathBuf};

use treadle::{Stage, StageContext, StageOutcome, TreadleError};

use sukta_core::model::Metric;
use sukta_core::rules::DeityRules;
use sukta_core::schema::Database;

use crate::corpus::load_corpus;
use crate::jobs::{run_assign, run_similarity, run_vectorize};

fn stage_error(what: &str, e: impl std::fmt::Display) -> TreadleError {
    TreadleError::StageExecution(format!("{what}: {e}"))
}

fn open(db_path: &Path) -> treadle::Result<Database> {
    Database::open(db_path).map_err(|e| stage_error("Failed to open database", e))
}

fn record(ctx: &mut StageContext, key: &str, report: &impl Serialize) -> treadle::Result<()> {
    let value =
        serde_json::to_value(report).map_err(|e| stage_error("Failed to serialize report", e))?;
    ctx.metadata.insert(key.to_string(), value);
    Ok(())
}

/// The Vectorize stage: build the vocabulary and store a new generation.
#[derive(Debug)]
pub struct VectorizeStage {
    corpus_path: PathBuf,
    rules: DeityRules,
    db_path: PathBuf,
}

impl VectorizeStage {
    #[must_use]
    pub fn new(corpus_path: PathBuf, rules: DeityRules, db_path: PathBuf) -> Self {
        Self {
            corpus_path,
            rules,
            db_path,
        }
    }
}

#[async_trait::async_trait]
impl Stage for VectorizeStage {
    fn name(&self) -> &str {
        "vectorize"
    }

    async fn execute(
        &self,
        item: &dyn treadle::WorkItem,
        ctx: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        log::info!("Vectorizing corpus {} for {}", self.corpus_path.display(), item.id());

        let corpus = load_corpus(&self.corpus_path)
            .map_err(|e| stage_error("Failed to load corpus", e))?;
        let db = open(&self.db_path)?;
        let report = run_vectorize(&db, &corpus, &self.rules)
            .map_err(|e| stage_error("Vectorization failed", e))?;

        log::info!(
            "Generation {}: {} deities, {} hymns ({} with no deity)",
            report.generation,
            report.deities,
            report.hymns,
            report.zero_vectors
        );
        record(ctx, "vectorize", &report)?;
        Ok(StageOutcome::Complete)
    }
}

/// The Assign stage: pick a primary deity for every stored hymn.
#[derive(Debug)]
pub struct AssignStage {
    rules: DeityRules,
    db_path: PathBuf,
}

impl AssignStage {
    #[must_use]
    pub fn new(rules: DeityRules, db_path: PathBuf) -> Self {
        Self { rules, db_path }
    }
}

#[async_trait::async_trait]
impl Stage for AssignStage {
    fn name(&self) -> &str {
        "assign"
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        ctx: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        let db = open(&self.db_path)?;
        let report = run_assign(&db, &self.rules.primary)
            .map_err(|e| stage_error("Primary-deity assignment failed", e))?;
        record(ctx, "assign", &report)?;
        Ok(StageOutcome::Complete)
    }
}

/// One similarity stage per metric, named `similarity-<metric>`.
#[derive(Debug)]
pub struct SimilarityStage {
    name: String,
    metric: Metric,
    min_similarity: Option<f64>,
    db_path: PathBuf,
}

impl SimilarityStage {
    #[must_use]
    pub fn new(metric: Metric, min_similarity: Option<f64>, db_path: PathBuf) -> Self {
        Self {
            name: Self::stage_name(metric),
            metric,
            min_similarity,
            db_path,
        }
    }

    #[must_use]
    pub fn stage_name(metric: Metric) -> String {
        format!("similarity-{metric}")
    }
}

#[async_trait::async_trait]
impl Stage for SimilarityStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        ctx: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        let db = open(&self.db_path)?;
        let metric = self.metric;
        let min_similarity = self.min_similarity;

        // The all-pairs pass is CPU bound; keep it off the async workers.
        let summary = tokio::task::spawn_blocking(move || run_similarity(&db, metric, min_similarity))
            .await
            .map_err(|e| stage_error("Similarity task panicked", e))?
            .map_err(|e| stage_error("Similarity computation failed", e))?;

        record(ctx, &self.name, &summary)?;
        Ok(StageOutcome::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work_item::BuildJob;
    use sukta_core::model::Namespace;

    const CORPUS: &str = r#"{
        "books": {
            "1": {
                "book_number": 1,
                "hymns": {
                    "1": {"hymn_number": 1, "title": "HYMN I. Agni.", "text": "Agni and Indra."},
                    "2": {"hymn_number": 2, "title": "HYMN II. Indra.", "text": "Indra and Agni."},
                    "3": {"hymn_number": 3, "title": "HYMN III. Soma.", "text": "Soma flows."}
                }
            }
        }
    }"#;

    fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.json");
        std::fs::write(&corpus_path, CORPUS).unwrap();
        let db_path = dir.path().join("sukta.db");
        (dir, corpus_path, db_path)
    }

    #[test]
    fn test_similarity_stage_name() {
        let stage = SimilarityStage::new(Metric::Dice, None, PathBuf::from("x.db"));
        assert_eq!(stage.name(), "similarity-dice");
    }

    #[tokio::test]
    async fn test_stages_run_in_order() {
        let (_dir, corpus_path, db_path) = fixture();
        let job = BuildJob::fresh(corpus_path.clone());
        let mut ctx = StageContext::new("vectorize".to_string());

        let vectorize = VectorizeStage::new(corpus_path, DeityRules::default(), db_path.clone());
        let outcome = vectorize.execute(&job, &mut ctx).await.unwrap();
        assert!(matches!(outcome, StageOutcome::Complete));
        assert!(ctx.metadata.contains_key("vectorize"));

        let assign = AssignStage::new(DeityRules::default(), db_path.clone());
        assign.execute(&job, &mut ctx).await.unwrap();

        let similarity = SimilarityStage::new(Metric::Cosine, Some(0.5), db_path.clone());
        similarity.execute(&job, &mut ctx).await.unwrap();
        assert!(ctx.metadata.contains_key("similarity-cosine"));

        let db = Database::open(&db_path).unwrap();
        assert_eq!(db.count_hymns().unwrap(), 3);
        assert_eq!(db.count_edges(Namespace::Cosine).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_similarity_stage_fails_without_vectors() {
        let (_dir, _corpus_path, db_path) = fixture();
        let job = BuildJob::new("empty", PathBuf::from("unused.json"));
        let mut ctx = StageContext::new("similarity-jaccard".to_string());

        let stage = SimilarityStage::new(Metric::Jaccard, None, db_path);
        assert!(stage.execute(&job, &mut ctx).await.is_err());
    }
}
