//! Batch jobs run against an open database.
//!
//! Each job is one complete pass: it reads what it needs from the corpus or
//! the store, computes, and writes its result back in a single transaction.
//! The pipeline stages and the CLI both drive these.

use serde::Serialize;
use std::path::Path;

use sukta_core::model::{Corpus, Metric, Namespace, Vocabulary};
use sukta_core::rules::{DeityRules, PrimaryRules};
use sukta_core::schema::Database;

use crate::assign::{assign_primary_deities, AssignmentReport};
use crate::error::{BuildError, BuildResult};
use crate::recount::recount_frequencies;
use crate::semantic::load_semantic_edges;
use crate::similarity::{compute_similarities, SimilaritySummary};
use crate::vectorize::Vectorizer;
use crate::vocabulary::build_vocabulary;

#[derive(Debug, Clone, Serialize)]
pub struct VectorizeReport {
    pub generation: String,
    pub deities: usize,
    pub hymns: usize,
    pub zero_vectors: usize,
    pub parse_anomalies: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ImportReport {
    pub stored: usize,
    pub rejected: usize,
    pub duplicates: usize,
}

/// Build a fresh vocabulary from `corpus`, vectorize every hymn and swap
/// both into the store as a new generation.
///
/// Primary deities are not assigned here; run [`run_assign`] afterwards.
pub fn run_vectorize(
    db: &Database,
    corpus: &Corpus,
    rules: &DeityRules,
) -> BuildResult<VectorizeReport> {
    let build = build_vocabulary(corpus, rules)?;
    let vectorizer = Vectorizer::new(&build.vocabulary, rules)?;
    let vectors = vectorizer.vectorize_corpus(corpus);

    db.replace_generation(&build.vocabulary, &vectors, corpus)?;

    Ok(VectorizeReport {
        generation: build.vocabulary.generation().to_string(),
        deities: build.vocabulary.len(),
        hymns: vectors.len(),
        zero_vectors: vectors.iter().filter(|v| v.vector.is_zero()).count(),
        parse_anomalies: build.anomalies.len(),
    })
}

/// Assign primary deities to every stored hymn, replacing prior assignments.
pub fn run_assign(db: &Database, rules: &PrimaryRules) -> BuildResult<AssignmentReport> {
    let vocabulary = stored_vocabulary(db)?;
    let corpus = db.load_corpus()?;

    let (assignments, report) = assign_primary_deities(&corpus, &vocabulary, rules)?;
    let pairs: Vec<_> = assignments
        .into_iter()
        .map(|a| (a.hymn_id, a.deity_id))
        .collect();
    db.replace_primary_deities(&pairs)?;

    Ok(report)
}

/// Replace the stored frequency of the top `top_n` deities with their
/// mention count across the stored corpus. Returns the rows updated.
pub fn run_recount(db: &Database, top_n: usize) -> BuildResult<usize> {
    let vocabulary = stored_vocabulary(db)?;
    let corpus = db.load_corpus()?;

    let counts = recount_frequencies(&corpus, &vocabulary, top_n);
    let updated = db.update_deity_frequencies(&counts)?;
    log::info!("Recounted frequencies for {} deities", updated);
    Ok(updated)
}

/// Score all pairs of stored vectors with `metric` and replace its namespace.
///
/// Refuses to run when the stored vectors do not match the stored vocabulary.
pub fn run_similarity(
    db: &Database,
    metric: Metric,
    min_similarity: Option<f64>,
) -> BuildResult<SimilaritySummary> {
    db.verify_vocabulary_consistency()?;
    let vectors = db.list_hymn_vectors()?;

    let run = compute_similarities(&vectors, metric, min_similarity);
    db.replace_edges(metric.namespace(), &run.edges)?;

    Ok(run.summary())
}

/// Replace the semantic namespace with the pairs listed in `path`.
pub fn run_import_semantic(db: &Database, path: &Path) -> BuildResult<ImportReport> {
    let import = load_semantic_edges(path)?;
    let stored = db.replace_edges(Namespace::Semantic, &import.edges)?;
    log::info!("Imported {} semantic edges from {}", stored, path.display());

    Ok(ImportReport {
        stored,
        rejected: import.rejected,
        duplicates: import.duplicates,
    })
}

fn stored_vocabulary(db: &Database) -> BuildResult<Vocabulary> {
    db.load_vocabulary()?.ok_or(BuildError::MissingVocabulary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukta_core::model::{Hymn, HymnId};

    fn corpus() -> Corpus {
        Corpus::new(vec![
            Hymn::new(1, 1, "HYMN I. Agni.", "I laud Agni, the chosen priest."),
            Hymn::new(1, 2, "HYMN II. Vāyu.", "Vāyu, come hither. Indra and Vāyu."),
            Hymn::new(1, 3, "HYMN III. Aśvins.", "Ye Aśvins, come with Indra."),
            Hymn::new(1, 4, "HYMN IV. Indra.", "Indra drinks the Soma. Agni shines."),
            Hymn::new(1, 5, "HYMN V. Indra.", "Indra, Agni and Vāyu."),
        ])
        .unwrap()
    }

    fn built() -> Database {
        let db = Database::open_in_memory().unwrap();
        run_vectorize(&db, &corpus(), &DeityRules::default()).unwrap();
        db
    }

    #[test]
    fn test_vectorize_stores_generation() {
        let db = Database::open_in_memory().unwrap();
        let report = run_vectorize(&db, &corpus(), &DeityRules::default()).unwrap();

        assert_eq!(report.hymns, 5);
        assert_eq!(report.deities, 4);
        assert_eq!(db.count_hymns().unwrap(), 5);
        let info = db.vocabulary_info().unwrap().unwrap();
        assert_eq!(info.generation, report.generation);
        assert!(db.verify_vocabulary_consistency().is_ok());
    }

    #[test]
    fn test_assign_requires_vocabulary() {
        let db = Database::open_in_memory().unwrap();
        let err = run_assign(&db, &PrimaryRules::default()).unwrap_err();
        assert!(matches!(err, BuildError::MissingVocabulary));
    }

    #[test]
    fn test_assign_sets_every_hymn() {
        let db = built();
        let report = run_assign(&db, &PrimaryRules::default()).unwrap();
        assert_eq!(report.unassigned, 0);
        assert_eq!(report.by_title, 5);

        let hymn = db.get_hymn_vector(&HymnId::from("4")).unwrap().unwrap();
        let vocabulary = db.load_vocabulary().unwrap().unwrap();
        let primary = hymn.primary_deity_id.unwrap();
        assert_eq!(vocabulary.by_id(primary).unwrap().name, "indra");
    }

    #[test]
    fn test_recount_updates_frequencies() {
        let db = built();
        let updated = run_recount(&db, 25).unwrap();
        assert_eq!(updated, 4);

        let vocabulary = db.load_vocabulary().unwrap().unwrap();
        // two titles plus four body mentions
        assert_eq!(vocabulary.frequency("indra"), Some(6));
    }

    #[test]
    fn test_similarity_replaces_namespace() {
        let db = built();
        let summary = run_similarity(&db, Metric::Jaccard, Some(0.3)).unwrap();
        assert_eq!(summary.pairs_scored, 10);
        assert_eq!(db.count_edges(Namespace::Jaccard).unwrap(), summary.edges_kept);

        let again = run_similarity(&db, Metric::Jaccard, Some(0.99)).unwrap();
        assert_eq!(db.count_edges(Namespace::Jaccard).unwrap(), again.edges_kept);
        assert!(again.edges_kept <= summary.edges_kept);
    }

    #[test]
    fn test_revectorize_clears_metric_edges_but_keeps_semantic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("semantic.json");
        std::fs::write(
            &path,
            r#"[{"hymn1_id": "1", "hymn2_id": "2", "similarity": 0.9}]"#,
        )
        .unwrap();

        let db = built();
        run_similarity(&db, Metric::Cosine, None).unwrap();
        let import = run_import_semantic(&db, &path).unwrap();
        assert_eq!(import.stored, 1);

        run_vectorize(&db, &corpus(), &DeityRules::default()).unwrap();
        assert_eq!(db.count_edges(Namespace::Cosine).unwrap(), 0);
        assert_eq!(db.count_edges(Namespace::Semantic).unwrap(), 1);
    }
}
