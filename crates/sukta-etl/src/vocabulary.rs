//! Building the deity vocabulary from hymn titles.

use std::collections::HashMap;

use sukta_core::model::{Corpus, DeityId, DeityTerm, HymnId, Vocabulary};
use sukta_core::rules::DeityRules;

use crate::error::{BuildError, BuildResult, ParseAnomaly};
use crate::normalize::parse_title;

/// A freshly built vocabulary plus what was learned building it.
#[derive(Debug, Clone)]
pub struct VocabularyBuild {
    pub vocabulary: Vocabulary,
    /// Hymn references per deity, in vocabulary order.
    pub references: Vec<(String, Vec<String>)>,
    /// Titles that matched no pattern.
    pub anomalies: Vec<(HymnId, ParseAnomaly)>,
}

/// Build a vocabulary with a fresh generation id.
///
/// Deities are ordered by descending reference count. Ties keep first-seen
/// order over the corpus, which is sorted by book then hymn, so identical
/// input always yields identical positions.
pub fn build_vocabulary(corpus: &Corpus, rules: &DeityRules) -> BuildResult<VocabularyBuild> {
    build_vocabulary_with_generation(corpus, rules, uuid::Uuid::new_v4().to_string())
}

pub fn build_vocabulary_with_generation(
    corpus: &Corpus,
    rules: &DeityRules,
    generation: String,
) -> BuildResult<VocabularyBuild> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut references: Vec<(String, Vec<String>)> = Vec::new();
    let mut anomalies = Vec::new();

    for hymn in corpus {
        let terms = match parse_title(&hymn.title, rules) {
            Ok(terms) => terms,
            Err(anomaly) => {
                log::debug!("Hymn {} title {:?}: {anomaly}", hymn.id, hymn.title);
                anomalies.push((hymn.id.clone(), anomaly));
                continue;
            }
        };
        for term in terms {
            let slot = *index.entry(term.clone()).or_insert_with(|| {
                references.push((term, Vec::new()));
                references.len() - 1
            });
            references[slot].1.push(hymn.reference());
        }
    }

    // Stable: equal counts keep first-seen order.
    references.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let terms = references
        .iter()
        .enumerate()
        .map(|(position, (name, refs))| {
            let id = u32::try_from(position)
                .map_err(|_| BuildError::VocabularyTooLarge(references.len()))?;
            Ok(DeityTerm {
                id: DeityId::new(id),
                name: name.clone(),
                position,
                frequency: refs.len() as u64,
            })
        })
        .collect::<BuildResult<Vec<_>>>()?;

    let vocabulary = Vocabulary::new(generation, terms)?;

    if !anomalies.is_empty() {
        log::warn!(
            "{} of {} titles matched no deity pattern and were skipped",
            anomalies.len(),
            corpus.len()
        );
    }
    if vocabulary.is_empty() {
        log::warn!("No deity could be extracted from any title; vectors will be empty");
    }
    log::info!(
        "Built vocabulary {} with {} deities",
        vocabulary.generation(),
        vocabulary.len()
    );

    Ok(VocabularyBuild {
        vocabulary,
        references,
        anomalies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukta_core::model::Hymn;

    fn corpus() -> Corpus {
        Corpus::new(vec![
            Hymn::new(1, 1, "HYMN I. Agni.", ""),
            Hymn::new(1, 2, "HYMN II. Indra-Agni.", ""),
            Hymn::new(1, 3, "HYMN III. Soma.", ""),
            Hymn::new(1, 4, "HYMN IV. Indra.", ""),
            Hymn::new(1, 5, "HYMN V. A very long unparseable title.", ""),
            Hymn::new(1, 6, "HYMN VI. Various.", ""),
        ])
        .unwrap()
    }

    #[test]
    fn test_positions_follow_reference_counts() {
        let build =
            build_vocabulary_with_generation(&corpus(), &DeityRules::default(), "g".into())
                .unwrap();
        let names: Vec<&str> = build
            .vocabulary
            .terms()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        // agni: 2, indra: 2 (agni seen first), soma: 1
        assert_eq!(names, vec!["agni", "indra", "soma"]);
        assert_eq!(build.vocabulary.frequency("agni"), Some(2));
        assert_eq!(build.vocabulary.frequency("soma"), Some(1));
        assert_eq!(
            build.references[0].1,
            vec!["Book 1, Hymn 1", "Book 1, Hymn 2"]
        );
    }

    #[test]
    fn test_anomalies_are_collected_not_fatal() {
        let build =
            build_vocabulary_with_generation(&corpus(), &DeityRules::default(), "g".into())
                .unwrap();
        assert_eq!(build.anomalies.len(), 1);
        assert_eq!(build.anomalies[0].0.as_str(), "5");
        assert!(build.vocabulary.get("various").is_none());
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let rules = DeityRules::default();
        let a = build_vocabulary(&corpus(), &rules).unwrap().vocabulary;
        let b = build_vocabulary(&corpus(), &rules).unwrap().vocabulary;
        assert_ne!(a.generation(), b.generation());
        assert_eq!(a.terms(), b.terms());
    }

    #[test]
    fn test_empty_corpus_gives_empty_vocabulary() {
        let build = build_vocabulary(&Corpus::default(), &DeityRules::default()).unwrap();
        assert!(build.vocabulary.is_empty());
    }
}
