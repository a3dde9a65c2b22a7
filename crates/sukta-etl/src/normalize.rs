//! Word normalization and title parsing.
//!
//! Titles follow `"<label> <number>. <deity tokens...>"`: the first two
//! whitespace tokens are boilerplate and the rest name one or two deities.

use std::collections::HashSet;

use sukta_core::rules::DeityRules;

use crate::error::ParseAnomaly;

const SENTENCE_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '"'];

/// Lowercase, trim, drop sentence punctuation, then drop a trailing
/// possessive (`'s` or `’s`). Diacritics are preserved.
///
/// Punctuation is removed before the possessive on purpose, not possessive
/// first: `Indra's,` must normalize to `indra`, where the reverse order
/// would leave `indra's` and split one deity into two vocabulary terms.
#[must_use]
pub fn normalize_word(word: &str) -> String {
    let stripped: String = word
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !SENTENCE_PUNCTUATION.contains(c))
        .collect();
    match stripped
        .strip_suffix("'s")
        .or_else(|| stripped.strip_suffix("’s"))
    {
        Some(base) => base.to_string(),
        None => stripped,
    }
}

/// The set of normalized words in a text. Words with an alias also
/// contribute their canonical spelling.
#[must_use]
pub fn normalized_words(text: &str, rules: &DeityRules) -> HashSet<String> {
    let mut words = HashSet::new();
    for raw in text.split_whitespace() {
        let word = normalize_word(raw);
        if word.is_empty() {
            continue;
        }
        if let Some(canonical) = rules.alias_for(&word) {
            words.insert(canonical.to_string());
        }
        words.insert(word);
    }
    words
}

/// Extract up to two deity terms from a title.
///
/// Returns the terms that survive the skip list (possibly none), or the
/// anomaly that kept the title from matching any pattern.
pub fn parse_title(title: &str, rules: &DeityRules) -> Result<Vec<String>, ParseAnomaly> {
    let tokens: Vec<&str> = title.split_whitespace().collect();

    let candidates: Vec<String> = match tokens.as_slice() {
        [_, _, phrase] => {
            let phrase = normalize_word(phrase);
            if phrase.contains('-') {
                phrase
                    .split('-')
                    .map(normalize_word)
                    .filter(|t| !t.is_empty())
                    .take(2)
                    .collect()
            } else {
                vec![phrase]
            }
        }
        [_, _, first, second] => vec![normalize_word(first), normalize_word(second)],
        [_, _, first, conj, second] if normalize_word(conj) == "and" => {
            vec![normalize_word(first), normalize_word(second)]
        }
        short if short.len() < 3 => return Err(ParseAnomaly::TooShort(short.len())),
        other => return Err(ParseAnomaly::Unrecognized(other.len())),
    };

    let mut terms: Vec<String> = Vec::with_capacity(2);
    for candidate in candidates {
        let term = rules.canonicalize(&candidate).to_string();
        if term.is_empty() || rules.is_skipped(&term) || terms.contains(&term) {
            continue;
        }
        terms.push(term);
    }
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(title: &str) -> Result<Vec<String>, ParseAnomaly> {
        parse_title(title, &DeityRules::default())
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("  Agni. "), "agni");
        assert_eq!(normalize_word("Indra's"), "indra");
        assert_eq!(normalize_word("Indra’s,"), "indra");
        assert_eq!(normalize_word("\"Varuṇa!\""), "varuṇa");
        assert_eq!(normalize_word("..."), "");
    }

    #[test]
    fn test_possessive_before_punctuation_is_stripped() {
        assert_eq!(normalize_word("Indra's,"), "indra");
        assert_eq!(normalize_word("Soma's."), "soma");
        assert_eq!(normalize_word("Indra's,"), normalize_word("Indra"));
    }

    #[test]
    fn test_single_deity_title() {
        assert_eq!(parse("HYMN I. Agni.").unwrap(), vec!["agni"]);
    }

    #[test]
    fn test_hyphenated_pair() {
        assert_eq!(parse("HYMN 1. Indra-Agni.").unwrap(), vec!["indra", "agni"]);
    }

    #[test]
    fn test_four_tokens() {
        assert_eq!(parse("HYMN II. Mitra Varuṇa.").unwrap(), vec!["mitra", "varuṇa"]);
    }

    #[test]
    fn test_five_tokens_with_and() {
        assert_eq!(parse("HYMN III. Indra and Soma.").unwrap(), vec!["indra", "soma"]);
    }

    #[test]
    fn test_five_tokens_without_and() {
        assert_eq!(
            parse("HYMN IV. Indra or Soma."),
            Err(ParseAnomaly::Unrecognized(5))
        );
    }

    #[test]
    fn test_too_short() {
        assert_eq!(parse("HYMN"), Err(ParseAnomaly::TooShort(1)));
        assert_eq!(parse(""), Err(ParseAnomaly::TooShort(0)));
    }

    #[test]
    fn test_long_title_unrecognized() {
        assert_eq!(
            parse("HYMN V. The Horse of the Sacrifice."),
            Err(ParseAnomaly::Unrecognized(7))
        );
    }

    #[test]
    fn test_skip_list_drops_terms() {
        assert!(parse("HYMN VI. Various.").unwrap().is_empty());
        assert_eq!(parse("HYMN VII. Fathers Agni.").unwrap(), vec!["agni"]);
        assert!(parse("HYMN VIII. Others-.").unwrap().is_empty());
    }

    #[test]
    fn test_alias_rewrites_term() {
        assert_eq!(parse("HYMN IX. Brahmaṇaspati.").unwrap(), vec!["bṛhaspati"]);
    }

    #[test]
    fn test_duplicate_terms_collapse() {
        assert_eq!(parse("HYMN X. Agni Agni.").unwrap(), vec!["agni"]);
    }

    #[test]
    fn test_normalized_words_adds_alias() {
        let words = normalized_words("Praise Brahmaṇaspati, and Agni's might.", &DeityRules::default());
        assert!(words.contains("brahmaṇaspati"));
        assert!(words.contains("bṛhaspati"));
        assert!(words.contains("agni"));
        assert!(words.contains("might"));
        assert!(!words.contains(""));
    }
}
