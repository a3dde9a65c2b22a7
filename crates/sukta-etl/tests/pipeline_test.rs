//! Integration tests for the corpus → vectors → edges flow.
//!
//! The corpus fixture is a handful of real-shaped hymns covering the title
//! patterns the vocabulary builder recognizes.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use sukta_core::model::{HymnId, Metric, Namespace};
use sukta_core::rules::DeityRules;
use sukta_core::schema::Database;
use sukta_etl::jobs::{run_assign, run_recount, run_similarity, run_vectorize};
use sukta_etl::{build_pipeline, corpus::load_corpus, ensure_complete, BuildJob};
use treadle::WorkItem;

const CORPUS: &str = r#"{
    "books": {
        "1": {
            "book_number": 1,
            "hymns": {
                "1": {"hymn_number": 1, "title": "HYMN I. Agni.",
                      "text": "I laud Agni, the chosen Priest, God, minister of sacrifice."},
                "2": {"hymn_number": 2, "title": "HYMN II. Vāyu.",
                      "text": "Beautiful Vāyu, come, for thee these Soma drops have been prepared."},
                "3": {"hymn_number": 3, "title": "HYMN III. Aśvins.",
                      "text": "Ye Aśvins, rich in treasure, come. Indra, come hither."},
                "4": {"hymn_number": 4, "title": "HYMN IV. Indra.",
                      "text": "Indra's wonder-working powers. Agni is kindled."},
                "5": {"hymn_number": 5, "title": "HYMN V. Mitra Varuṇa.",
                      "text": "Mitra and Varuṇa, strong and holy."}
            }
        },
        "2": {
            "book_number": 2,
            "hymns": {
                "6": {"hymn_number": 6, "title": "HYMN VI. Indra-Agni.",
                      "text": "Indra and Agni, come to our libation."},
                "7": {"hymn_number": 7, "title": "HYMN VII",
                      "text": "A hymn without a deity in its title."}
            }
        }
    }
}"#;

fn write_corpus(dir: &Path) -> PathBuf {
    let path = dir.join("rigveda.json");
    std::fs::write(&path, CORPUS).unwrap();
    path
}

#[tokio::test]
async fn test_pipeline_construction() {
    let temp_dir = TempDir::new().unwrap();
    let corpus_path = write_corpus(temp_dir.path());
    let db_path = temp_dir.path().join("sukta.db");

    let result = build_pipeline(
        corpus_path,
        db_path,
        DeityRules::default(),
        &Metric::ALL,
        Some(0.3),
    );
    assert!(result.is_ok(), "Pipeline should build successfully");
}

#[tokio::test]
async fn test_pipeline_requires_a_metric() {
    let temp_dir = TempDir::new().unwrap();
    let result = build_pipeline(
        temp_dir.path().join("rigveda.json"),
        temp_dir.path().join("sukta.db"),
        DeityRules::default(),
        &[],
        None,
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn test_pipeline_advance_vectorizes() {
    let temp_dir = TempDir::new().unwrap();
    let corpus_path = write_corpus(temp_dir.path());
    let db_path = temp_dir.path().join("sukta.db");

    let workflow = build_pipeline(
        corpus_path.clone(),
        db_path.clone(),
        DeityRules::default(),
        &[Metric::Cosine],
        Some(0.3),
    )
    .unwrap();
    let mut store = treadle::SqliteStateStore::open(&temp_dir.path().join("pipeline.db"))
        .await
        .unwrap();

    let job = BuildJob::fresh(corpus_path);
    workflow.advance(&job, &mut store).await.unwrap();
    ensure_complete(&workflow, job.id(), &store).await.unwrap();

    let db = Database::open(&db_path).unwrap();
    assert_eq!(db.count_hymns().unwrap(), 7);
    assert!(db.verify_vocabulary_consistency().is_ok());
}

#[tokio::test]
async fn test_failed_stage_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let corpus_path = temp_dir.path().join("missing.json");
    let db_path = temp_dir.path().join("sukta.db");

    let workflow = build_pipeline(
        corpus_path.clone(),
        db_path.clone(),
        DeityRules::default(),
        &[Metric::Cosine],
        Some(0.3),
    )
    .unwrap();
    let mut store = treadle::SqliteStateStore::open(&temp_dir.path().join("pipeline.db"))
        .await
        .unwrap();

    let job = BuildJob::fresh(corpus_path);
    // advance itself succeeds; the failure lives in the stage state
    workflow.advance(&job, &mut store).await.unwrap();

    let err = ensure_complete(&workflow, job.id(), &store)
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("failed stages: vectorize"), "{err}");
    assert!(err.contains("assign"), "{err}");
    assert!(err.contains("similarity-cosine"), "{err}");

    let db = Database::open(&db_path).unwrap();
    assert_eq!(db.count_hymns().unwrap(), 0);
}

#[test]
fn test_full_build_flow() {
    let temp_dir = TempDir::new().unwrap();
    let corpus_path = write_corpus(temp_dir.path());
    let db = Database::open(temp_dir.path().join("sukta.db")).unwrap();
    let rules = DeityRules::default();

    let corpus = load_corpus(&corpus_path).unwrap();
    let report = run_vectorize(&db, &corpus, &rules).unwrap();
    assert_eq!(report.hymns, 7);
    assert_eq!(report.parse_anomalies, 1);

    let vocabulary = db.load_vocabulary().unwrap().unwrap();
    for name in ["agni", "indra", "mitra", "varuṇa", "vāyu", "aśvins"] {
        assert!(vocabulary.get(name).is_some(), "missing {name}");
    }
    // agni and indra are each named in two titles
    assert!(vocabulary.position_of("agni").unwrap() < 2);
    assert!(vocabulary.position_of("indra").unwrap() < 2);

    let assignment = run_assign(&db, &rules.primary).unwrap();
    assert_eq!(assignment.unassigned, 0);
    assert_eq!(assignment.by_title, 6);

    assert!(run_recount(&db, 25).unwrap() > 0);

    for metric in Metric::ALL {
        let summary = run_similarity(&db, metric, Some(0.3)).unwrap();
        assert_eq!(summary.pairs_scored, 21);
    }

    let edges = db.list_edges(Namespace::Cosine).unwrap();
    assert!(edges.iter().all(|e| e.hymn1 < e.hymn2));
    assert!(edges.iter().all(|e| e.similarity >= 0.3));

    // hymns 4 and 6 both carry exactly {indra, agni}
    let pair = db
        .edge_similarity(Namespace::Cosine, &HymnId::from("6"), &HymnId::from("4"))
        .unwrap();
    assert_eq!(pair, Some(1.0));
}

#[test]
fn test_build_job_work_item() {
    let job = BuildJob::new("rebuild", PathBuf::from("/data/rigveda.json"));
    assert_eq!(job.id(), "rebuild");
    assert_eq!(format!("{job}"), "/data/rigveda.json");
}
