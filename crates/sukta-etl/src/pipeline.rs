use std::path::PathBuf;
use treadle::{StageStatus, StateStore, TreadleError, Workflow};

use sukta_core::model::Metric;
use sukta_core::rules::DeityRules;

use crate::{AssignStage, SimilarityStage, VectorizeStage};

/// Build the full rebuild pipeline: vectorize, then assign and one
/// similarity stage per metric, each depending on vectorize.
///
/// # Errors
/// Returns an error if no metric is given or the workflow cannot be built.
pub fn build_pipeline(
    corpus_path: PathBuf,
    db_path: PathBuf,
    rules: DeityRules,
    metrics: &[Metric],
    min_similarity: Option<f64>,
) -> treadle::Result<Workflow> {
    if metrics.is_empty() {
        return Err(treadle::TreadleError::InvalidWorkflow(
            "at least one similarity metric is required".to_string(),
        ));
    }

    let mut builder = Workflow::builder()
        .stage(
            "vectorize",
            VectorizeStage::new(corpus_path, rules.clone(), db_path.clone()),
        )
        .stage("assign", AssignStage::new(rules, db_path.clone()))
        .dependency("assign", "vectorize");

    let mut seen = Vec::with_capacity(metrics.len());
    for &metric in metrics {
        if seen.contains(&metric) {
            continue;
        }
        seen.push(metric);
        let name = SimilarityStage::stage_name(metric);
        builder = builder
            .stage(
                name.as_str(),
                SimilarityStage::new(metric, min_similarity, db_path.clone()),
            )
            .dependency(name.as_str(), "vectorize");
    }

    builder.build()
}

/// Fail unless every stage of `workflow` completed for `item_id`.
///
/// `Workflow::advance` records a failed stage and still returns `Ok`, so the
/// stored stage states are the only reliable outcome.
///
/// # Errors
/// Returns `StageExecution` naming the failed and unfinished stages, or the
/// state store's error if it cannot be read.
pub async fn ensure_complete<S: StateStore>(
    workflow: &Workflow,
    item_id: &str,
    store: &S,
) -> treadle::Result<()> {
    if workflow.is_complete(item_id, store).await? {
        return Ok(());
    }

    let status = workflow.status(item_id, store).await?;
    let failed: Vec<String> = status
        .stages
        .iter()
        .filter(|s| s.status == StageStatus::Failed)
        .map(|s| match &s.error {
            Some(error) => format!("{} ({error})", s.name),
            None => s.name.clone(),
        })
        .collect();
    let unfinished: Vec<&str> = status
        .stages
        .iter()
        .filter(|s| !matches!(s.status, StageStatus::Complete | StageStatus::Failed))
        .map(|s| s.name.as_str())
        .collect();

    let mut parts = Vec::with_capacity(2);
    if !failed.is_empty() {
        parts.push(format!("failed stages: {}", failed.join(", ")));
    }
    if !unfinished.is_empty() {
        parts.push(format!("not finished: {}", unfinished.join(", ")));
    }
    let message = if parts.is_empty() {
        "pipeline stopped early".to_string()
    } else {
        parts.join("; ")
    };
    Err(TreadleError::StageExecution(message))
}
