//! Primary-deity assignment.
//!
//! Each hymn gets one dominant deity from a restricted candidate set: the
//! top-N vocabulary terms minus the configured exclusions. A title match
//! wins outright; otherwise the candidate mentioned most often in the body
//! wins, earlier rank breaking ties. Hymns with no candidate mention fall
//! back to a default deity.
//!
//! The fallback trades precision for recall and inflates the default
//! deity's hymn count. Treat its assignments as low confidence.

use serde::Serialize;

use sukta_core::model::{Corpus, DeityId, DeityTerm, HymnId, Vocabulary};
use sukta_core::rules::PrimaryRules;

use crate::error::{BuildError, BuildResult};

/// How a hymn's primary deity was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    Title,
    Body,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub hymn_id: HymnId,
    pub deity_id: DeityId,
    pub source: AssignmentSource,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignmentReport {
    pub by_title: usize,
    pub by_body: usize,
    pub defaulted: usize,
    pub unassigned: usize,
    pub default_deity: Option<String>,
}

/// The candidate deities, in rank order.
pub fn candidates<'a>(vocabulary: &'a Vocabulary, rules: &PrimaryRules) -> Vec<&'a DeityTerm> {
    vocabulary
        .terms()
        .iter()
        .take(rules.top_n)
        .filter(|t| !rules.exclusions.iter().any(|e| e == &t.name))
        .collect()
}

/// Assign a primary deity to every hymn of the corpus.
pub fn assign_primary_deities(
    corpus: &Corpus,
    vocabulary: &Vocabulary,
    rules: &PrimaryRules,
) -> BuildResult<(Vec<Assignment>, AssignmentReport)> {
    let candidates = candidates(vocabulary, rules);
    let fallback = default_deity(vocabulary, rules)?;

    let mut report = AssignmentReport {
        default_deity: fallback.map(|t| t.name.clone()),
        ..AssignmentReport::default()
    };
    let mut assignments = Vec::with_capacity(corpus.len());

    for hymn in corpus {
        let title = hymn.title.to_lowercase();
        let chosen = candidates
            .iter()
            .find(|c| title.contains(c.name.as_str()))
            .map(|c| (c.id, AssignmentSource::Title))
            .or_else(|| {
                let text = hymn.text.to_lowercase();
                most_mentioned(&candidates, &text).map(|c| (c.id, AssignmentSource::Body))
            })
            .or_else(|| fallback.map(|t| (t.id, AssignmentSource::Default)));

        match chosen {
            Some((deity_id, source)) => {
                match source {
                    AssignmentSource::Title => report.by_title += 1,
                    AssignmentSource::Body => report.by_body += 1,
                    AssignmentSource::Default => report.defaulted += 1,
                }
                assignments.push(Assignment {
                    hymn_id: hymn.id.clone(),
                    deity_id,
                    source,
                });
            }
            None => report.unassigned += 1,
        }
    }

    if report.defaulted > 0 {
        log::warn!(
            "{} hymns had no candidate mention and were assigned to default deity '{}'",
            report.defaulted,
            report.default_deity.as_deref().unwrap_or_default()
        );
    }
    log::info!(
        "Assigned primary deities: {} by title, {} by body, {} by default, {} unassigned",
        report.by_title,
        report.by_body,
        report.defaulted,
        report.unassigned
    );

    Ok((assignments, report))
}

/// The candidate with the most literal occurrences in `text`; the first
/// maximum in rank order wins.
fn most_mentioned<'a>(candidates: &[&'a DeityTerm], text: &str) -> Option<&'a DeityTerm> {
    let mut best: Option<(&DeityTerm, usize)> = None;
    for &candidate in candidates {
        let count = overlapping_count(text, &candidate.name);
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((candidate, count));
        }
    }
    best.map(|(term, _)| term)
}

/// Occurrences of `needle` in `haystack`, overlaps included.
fn overlapping_count(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack
        .char_indices()
        .filter(|(start, _)| haystack[*start..].starts_with(needle))
        .count()
}

fn default_deity<'a>(
    vocabulary: &'a Vocabulary,
    rules: &PrimaryRules,
) -> BuildResult<Option<&'a DeityTerm>> {
    match &rules.default_deity {
        Some(name) => vocabulary
            .get(name)
            .map(Some)
            .ok_or_else(|| BuildError::UnknownDefaultDeity(name.clone())),
        None => Ok(vocabulary.terms().first()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukta_core::model::Hymn;

    fn vocabulary() -> Vocabulary {
        let names = ["indra", "agni", "viśvedevas", "soma", "mitra"];
        let terms = names
            .iter()
            .enumerate()
            .map(|(i, name)| DeityTerm {
                id: DeityId::new(u32::try_from(i).unwrap()),
                name: (*name).to_string(),
                position: i,
                frequency: 10 - i as u64,
            })
            .collect();
        Vocabulary::new("g", terms).unwrap()
    }

    fn rules(top_n: usize) -> PrimaryRules {
        PrimaryRules {
            top_n,
            ..PrimaryRules::default()
        }
    }

    fn assign(hymns: Vec<Hymn>, rules: &PrimaryRules) -> (Vec<Assignment>, AssignmentReport) {
        let corpus = Corpus::new(hymns).unwrap();
        assign_primary_deities(&corpus, &vocabulary(), rules).unwrap()
    }

    #[test]
    fn test_candidates_skip_exclusions_and_respect_top_n() {
        let vocab = vocabulary();
        let names: Vec<&str> = candidates(&vocab, &rules(4))
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["indra", "agni", "soma"]);
    }

    #[test]
    fn test_title_match_wins() {
        let (a, report) = assign(
            vec![Hymn::new(1, 1, "HYMN I. Soma.", "indra indra indra")],
            &rules(25),
        );
        assert_eq!(a[0].deity_id, DeityId::new(3));
        assert_eq!(a[0].source, AssignmentSource::Title);
        assert_eq!(report.by_title, 1);
    }

    #[test]
    fn test_title_match_uses_rank_order() {
        let (a, _) = assign(
            vec![Hymn::new(1, 1, "HYMN I. Agni and Indra.", "")],
            &rules(25),
        );
        assert_eq!(a[0].deity_id, DeityId::new(0));
    }

    #[test]
    fn test_body_count_decides() {
        let (a, _) = assign(
            vec![Hymn::new(1, 1, "HYMN I.", "Agni, Soma, soma and SOMA. Agni.")],
            &rules(25),
        );
        assert_eq!(a[0].deity_id, DeityId::new(3));
        assert_eq!(a[0].source, AssignmentSource::Body);
    }

    #[test]
    fn test_body_tie_goes_to_earlier_rank() {
        let (a, _) = assign(
            vec![Hymn::new(1, 1, "HYMN I.", "soma agni")],
            &rules(25),
        );
        assert_eq!(a[0].deity_id, DeityId::new(1));
    }

    #[test]
    fn test_excluded_deity_never_chosen() {
        let (a, _) = assign(
            vec![Hymn::new(1, 1, "HYMN I. Viśvedevas.", "viśvedevas mitra")],
            &rules(25),
        );
        assert_eq!(a[0].deity_id, DeityId::new(4));
    }

    #[test]
    fn test_fallback_to_most_frequent() {
        let (a, report) = assign(
            vec![Hymn::new(1, 1, "HYMN I. Dawn.", "nothing relevant")],
            &rules(25),
        );
        assert_eq!(a[0].deity_id, DeityId::new(0));
        assert_eq!(a[0].source, AssignmentSource::Default);
        assert_eq!(report.defaulted, 1);
        assert_eq!(report.default_deity.as_deref(), Some("indra"));
    }

    #[test]
    fn test_configured_default() {
        let rules = PrimaryRules {
            default_deity: Some("mitra".to_string()),
            ..PrimaryRules::default()
        };
        let (a, _) = assign(vec![Hymn::new(1, 1, "HYMN I.", "")], &rules);
        assert_eq!(a[0].deity_id, DeityId::new(4));
    }

    #[test]
    fn test_unknown_default_is_an_error() {
        let rules = PrimaryRules {
            default_deity: Some("zeus".to_string()),
            ..PrimaryRules::default()
        };
        let corpus = Corpus::new(vec![Hymn::new(1, 1, "HYMN I.", "")]).unwrap();
        let err = assign_primary_deities(&corpus, &vocabulary(), &rules).unwrap_err();
        assert!(matches!(err, BuildError::UnknownDefaultDeity(_)));
    }

    #[test]
    fn test_every_hymn_assigned() {
        let (a, report) = assign(
            vec![
                Hymn::new(1, 1, "HYMN I. Agni.", ""),
                Hymn::new(1, 2, "HYMN II.", "soma"),
                Hymn::new(1, 3, "HYMN III.", ""),
            ],
            &rules(25),
        );
        assert_eq!(a.len(), 3);
        assert_eq!(report.unassigned, 0);
    }

    #[test]
    fn test_overlapping_count() {
        assert_eq!(overlapping_count("aaaa", "aa"), 3);
        assert_eq!(overlapping_count("Indra, indra", "indra"), 1);
        assert_eq!(overlapping_count("soma", ""), 0);
    }
}
