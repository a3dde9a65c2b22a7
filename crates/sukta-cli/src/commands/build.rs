use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use sukta_core::model::Metric;
use sukta_core::schema::Database;
use sukta_etl::corpus::load_corpus;
use sukta_etl::jobs::{run_assign, run_import_semantic, run_recount, run_similarity, run_vectorize};
use sukta_etl::{build_pipeline, ensure_complete, BuildJob, Config};
use treadle::WorkItem;

/// Rebuild everything from the corpus through the treadle pipeline.
///
/// Steps:
/// 1. Vectorize - build the deity vocabulary and a vector per hymn
/// 2. Assign - choose each hymn's primary deity
/// 3. Similarity - score all pairs, one stage per configured metric
pub async fn run_build(corpus_path: PathBuf, db_path: PathBuf, config: &Config) -> Result<()> {
    log::info!("Starting build from {}", corpus_path.display());

    println!("\n🕉  Sukta Build Pipeline\n");
    println!("  Corpus: {}", corpus_path.display());
    println!("  Database: {}", db_path.display());
    println!(
        "  Metrics: {}",
        config
            .similarity
            .metrics
            .iter()
            .map(|m| m.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();

    let workflow = build_pipeline(
        corpus_path.clone(),
        db_path.clone(),
        config.deity_rules()?,
        &config.similarity.metrics,
        Some(config.similarity.min_similarity),
    )
    .context("Failed to build pipeline")?;

    let state_path = db_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?
        .join("pipeline.db");
    let mut store = treadle::SqliteStateStore::open(&state_path)
        .await
        .context("Failed to open pipeline state store")?;

    // Every rebuild is a new work item so no stage is skipped as done.
    let job = BuildJob::fresh(corpus_path);

    let mut events = workflow.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                treadle::WorkflowEvent::StageStarted { stage, .. } => {
                    println!("  ⏳ [{stage}] Starting...");
                }
                treadle::WorkflowEvent::StageCompleted { stage, .. } => {
                    println!("  ✓ [{stage}] Complete");
                }
                treadle::WorkflowEvent::StageFailed { stage, error, .. } => {
                    eprintln!("  ✗ [{stage}] FAILED: {error}");
                }
                _ => {}
            }
        }
    });

    workflow
        .advance(&job, &mut store)
        .await
        .context("Pipeline execution failed")?;
    ensure_complete(&workflow, job.id(), &store)
        .await
        .context("Build did not complete")?;

    println!("\n✓ Build complete!");
    println!("\nNext steps:");
    println!("  - Run 'sukta status' to inspect the vocabulary and edges");
    println!("  - Run 'sukta neighbors <hymn>' to query similar hymns");

    Ok(())
}

pub fn vectorize(corpus_path: &Path, db_path: &Path, config: &Config) -> Result<()> {
    let corpus = load_corpus(corpus_path).context("Failed to load corpus")?;
    let db = Database::open(db_path).context("Failed to open database")?;
    let report = run_vectorize(&db, &corpus, &config.deity_rules()?)?;

    println!("✓ Vectorized {} hymns", report.hymns);
    println!("  Vocabulary generation: {}", report.generation);
    println!("  Deities: {}", report.deities);
    println!("  Hymns with no deity: {}", report.zero_vectors);
    println!("  Titles with no usable pattern: {}", report.parse_anomalies);
    println!("\nRun 'sukta assign' and 'sukta similarity' next.");
    Ok(())
}

pub fn assign(db_path: &Path, config: &Config) -> Result<()> {
    let db = Database::open(db_path).context("Failed to open database")?;
    let report = run_assign(&db, &config.deity_rules()?.primary)?;

    println!("✓ Assigned primary deities");
    println!("  By title: {}", report.by_title);
    println!("  By body mentions: {}", report.by_body);
    println!(
        "  By fallback to '{}': {}",
        report.default_deity.as_deref().unwrap_or("<none>"),
        report.defaulted
    );
    if report.unassigned > 0 {
        println!("  Unassigned: {}", report.unassigned);
    }
    if report.defaulted > 0 {
        println!("\n  Note: fallback assignments are low confidence.");
    }
    Ok(())
}

pub fn recount(db_path: &Path, top_n: Option<usize>, config: &Config) -> Result<()> {
    let db = Database::open(db_path).context("Failed to open database")?;
    let top_n = match top_n {
        Some(n) => n,
        None => config.deity_rules()?.primary.top_n,
    };
    let updated = run_recount(&db, top_n)?;
    println!("✓ Recounted mention frequencies for {updated} deities");
    Ok(())
}

pub fn similarity(
    db_path: &Path,
    metrics: Vec<Metric>,
    min_similarity: Option<f64>,
    config: &Config,
) -> Result<()> {
    let db = Database::open(db_path).context("Failed to open database")?;
    let metrics = if metrics.is_empty() {
        config.similarity.metrics.clone()
    } else {
        metrics
    };

    for metric in metrics {
        let summary = run_similarity(&db, metric, min_similarity)
            .with_context(|| format!("Failed to compute {metric} similarities"))?;
        println!(
            "✓ {}: kept {} of {} pairs",
            metric, summary.edges_kept, summary.pairs_scored
        );
    }
    Ok(())
}

pub fn import_semantic(path: &Path, db_path: &Path) -> Result<()> {
    let db = Database::open(db_path).context("Failed to open database")?;
    let report = run_import_semantic(&db, path)?;

    println!("✓ Imported {} semantic edges", report.stored);
    if report.rejected > 0 || report.duplicates > 0 {
        println!(
            "  Dropped {} invalid and {} duplicate pairs",
            report.rejected, report.duplicates
        );
    }
    Ok(())
}
