//! Turning hymns into binary deity vectors.

use regex::Regex;

use sukta_core::model::{Corpus, DeityVector, Hymn, HymnVector, Vocabulary};
use sukta_core::rules::DeityRules;

use crate::error::BuildResult;
use crate::normalize::normalized_words;

/// Builds [`HymnVector`]s against one vocabulary.
#[derive(Debug)]
pub struct Vectorizer<'a> {
    vocabulary: &'a Vocabulary,
    rules: &'a DeityRules,
    words: Regex,
}

impl<'a> Vectorizer<'a> {
    pub fn new(vocabulary: &'a Vocabulary, rules: &'a DeityRules) -> BuildResult<Self> {
        Ok(Self {
            vocabulary,
            rules,
            words: Regex::new(r"\b\w+\b")?,
        })
    }

    /// Vectorize one hymn. A hymn matching no deity gets an all-zero vector.
    ///
    /// A term is present when it equals a normalized word of the title or
    /// body; substrings do not count.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn vectorize(&self, hymn: &Hymn) -> HymnVector {
        let mut words = normalized_words(&hymn.title, self.rules);
        words.extend(normalized_words(&hymn.text, self.rules));

        let mut vector = DeityVector::zeros(self.vocabulary.len());
        let mut deity_names = Vec::new();
        let mut hymn_score = 0.0;
        for term in self.vocabulary.terms() {
            if words.contains(&term.name) {
                vector.set(term.position);
                deity_names.push(term.name.clone());
                hymn_score += term.frequency as f64;
            }
        }

        HymnVector {
            hymn_id: hymn.id.clone(),
            book_number: hymn.book_number,
            hymn_number: hymn.hymn_number,
            title: hymn.title.clone(),
            deity_count: vector.count_ones(),
            vector,
            deity_names,
            hymn_score,
            primary_deity_id: None,
            word_count: self.word_count(&hymn.text),
        }
    }

    /// Vectorize the whole corpus, in corpus order.
    #[must_use]
    pub fn vectorize_corpus(&self, corpus: &Corpus) -> Vec<HymnVector> {
        let vectors: Vec<HymnVector> = corpus.iter().map(|h| self.vectorize(h)).collect();
        let empty = vectors.iter().filter(|v| v.deity_count == 0).count();
        log::info!(
            "Vectorized {} hymns over {} deities ({} with no deity)",
            vectors.len(),
            self.vocabulary.len(),
            empty
        );
        vectors
    }

    /// Number of `\w+` words in a text.
    #[must_use]
    pub fn word_count(&self, text: &str) -> u32 {
        u32::try_from(self.words.find_iter(text).count()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukta_core::model::{DeityId, DeityTerm};

    fn vocabulary() -> Vocabulary {
        let names = [("indra", 10), ("agni", 6), ("bṛhaspati", 2), ("soma", 1)];
        let terms = names
            .iter()
            .enumerate()
            .map(|(i, (name, frequency))| DeityTerm {
                id: DeityId::new(u32::try_from(i).unwrap()),
                name: (*name).to_string(),
                position: i,
                frequency: *frequency,
            })
            .collect();
        Vocabulary::new("g", terms).unwrap()
    }

    #[test]
    fn test_vectorize_title_and_body() {
        let vocab = vocabulary();
        let rules = DeityRules::default();
        let v = Vectorizer::new(&vocab, &rules).unwrap();
        let hymn = Hymn::new(1, 1, "HYMN I. Agni.", "Indra's bolt, Indra's might.");
        let out = v.vectorize(&hymn);
        assert_eq!(out.vector.to_bits(), vec![1, 1, 0, 0]);
        assert_eq!(out.deity_names, vec!["indra", "agni"]);
        assert_eq!(out.deity_count, 2);
        assert!((out.hymn_score - 16.0).abs() < f64::EPSILON);
        assert_eq!(out.word_count, 6);
    }

    #[test]
    fn test_whole_word_match_only() {
        let vocab = vocabulary();
        let rules = DeityRules::default();
        let v = Vectorizer::new(&vocab, &rules).unwrap();
        let hymn = Hymn::new(1, 2, "HYMN II.", "Somatic agnis");
        let out = v.vectorize(&hymn);
        assert_eq!(out.deity_count, 0);
    }

    #[test]
    fn test_alias_marks_canonical_term() {
        let vocab = vocabulary();
        let rules = DeityRules::default();
        let v = Vectorizer::new(&vocab, &rules).unwrap();
        let hymn = Hymn::new(1, 3, "HYMN III.", "Brahmaṇaspati, lord of prayer");
        let out = v.vectorize(&hymn);
        assert_eq!(out.deity_names, vec!["bṛhaspati"]);
    }

    #[test]
    fn test_zero_vector_is_valid() {
        let vocab = vocabulary();
        let rules = DeityRules::default();
        let v = Vectorizer::new(&vocab, &rules).unwrap();
        let out = v.vectorize(&Hymn::new(1, 4, "HYMN IV.", "Nothing here"));
        assert!(out.vector.is_zero());
        assert_eq!(out.vector.len(), 4);
        assert_eq!(out.deity_count, 0);
        assert_eq!(out.hymn_score, 0.0);
    }

    #[test]
    fn test_vector_length_matches_vocabulary() {
        let vocab = vocabulary();
        let rules = DeityRules::default();
        let v = Vectorizer::new(&vocab, &rules).unwrap();
        let corpus = Corpus::new(vec![
            Hymn::new(1, 1, "HYMN I. Agni.", "a"),
            Hymn::new(1, 2, "HYMN II. Soma.", "b"),
        ])
        .unwrap();
        let vectors = v.vectorize_corpus(&corpus);
        assert!(vectors.iter().all(|h| h.vector.len() == vocab.len()));
    }
}
