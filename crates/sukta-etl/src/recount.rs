//! Recounting deity frequencies from full-corpus mentions.
//!
//! Title-derived frequencies undercount deities that are praised in the body
//! but rarely named in a title. A recount replaces the frequency of the top-N
//! deities with their literal, case-insensitive occurrence count across all
//! titles and texts.

use sukta_core::model::{Corpus, DeityId, Vocabulary};

/// Mention counts for the first `top_n` vocabulary positions.
#[must_use]
pub fn recount_frequencies(
    corpus: &Corpus,
    vocabulary: &Vocabulary,
    top_n: usize,
) -> Vec<(DeityId, u64)> {
    let lowered: Vec<(String, String)> = corpus
        .iter()
        .map(|h| (h.title.to_lowercase(), h.text.to_lowercase()))
        .collect();

    vocabulary
        .terms()
        .iter()
        .take(top_n)
        .map(|term| {
            let name = term.name.to_lowercase();
            let count: usize = lowered
                .iter()
                .map(|(title, text)| title.matches(&name).count() + text.matches(&name).count())
                .sum();
            log::debug!("Deity '{}' mentioned {} times", term.name, count);
            (term.id, count as u64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukta_core::model::{DeityTerm, Hymn};

    #[test]
    fn test_recount_counts_titles_and_texts() {
        let vocab = Vocabulary::new(
            "g",
            vec![
                DeityTerm {
                    id: DeityId::new(0),
                    name: "agni".into(),
                    position: 0,
                    frequency: 1,
                },
                DeityTerm {
                    id: DeityId::new(1),
                    name: "soma".into(),
                    position: 1,
                    frequency: 1,
                },
            ],
        )
        .unwrap();
        let corpus = Corpus::new(vec![
            Hymn::new(1, 1, "HYMN I. Agni.", "Agni, agni! Somavat"),
            Hymn::new(1, 2, "HYMN II.", "AGNI"),
        ])
        .unwrap();

        let counts = recount_frequencies(&corpus, &vocab, 25);
        assert_eq!(counts, vec![(DeityId::new(0), 4), (DeityId::new(1), 1)]);

        let limited = recount_frequencies(&corpus, &vocab, 1);
        assert_eq!(limited.len(), 1);
    }
}
