//! Deity rules: the skip list, alias table and primary-deity policy that
//! steer vocabulary building and assignment.
//!
//! Rules default to the built-in set and can be overridden from a TOML file:
//!
//! ```toml
//! skip_terms = ["unknown", "various", "fathers"]
//!
//! [[aliases]]
//! from = "brahmaṇaspati"
//! to = "bṛhaspati"
//!
//! [primary]
//! top_n = 25
//! exclusions = ["viśvedevas", "dawn", "heaven", "earth", "waters"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Boilerplate tokens that titles carry but that never name a deity.
pub const DEFAULT_SKIP_TERMS: &[&str] = &[
    "variousdeities",
    "unknown",
    "etc",
    "the",
    "gods",
    "various",
    "press",
    "post",
    "go",
    "some",
    "others",
    "new",
    "others-",
    "fathers",
    "and",
    "of",
    "to",
    "with",
];

/// Collective or abstract terms that make poor primary deities.
pub const DEFAULT_EXCLUSIONS: &[&str] = &["viśvedevas", "dawn", "heaven", "earth", "waters"];

pub const DEFAULT_TOP_N: usize = 25;

/// A variant spelling canonicalized to one vocabulary term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub from: String,
    pub to: String,
}

/// Candidate restriction and fallback for primary-deity assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryRules {
    /// Only deities at positions `0..top_n` are candidates.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<String>,

    /// Fallback for hymns with no candidate mention. When unset, the deity
    /// at position 0 (the most frequent) is used.
    #[serde(default)]
    pub default_deity: Option<String>,
}

impl Default for PrimaryRules {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            exclusions: default_exclusions(),
            default_deity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeityRules {
    #[serde(default = "default_skip_terms")]
    pub skip_terms: Vec<String>,

    #[serde(default = "default_aliases")]
    pub aliases: Vec<Alias>,

    #[serde(default)]
    pub primary: PrimaryRules,
}

impl Default for DeityRules {
    fn default() -> Self {
        Self {
            skip_terms: default_skip_terms(),
            aliases: default_aliases(),
            primary: PrimaryRules::default(),
        }
    }
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_exclusions() -> Vec<String> {
    DEFAULT_EXCLUSIONS.iter().map(ToString::to_string).collect()
}

fn default_skip_terms() -> Vec<String> {
    DEFAULT_SKIP_TERMS.iter().map(ToString::to_string).collect()
}

fn default_aliases() -> Vec<Alias> {
    vec![Alias {
        from: "brahmaṇaspati".to_string(),
        to: "bṛhaspati".to_string(),
    }]
}

impl DeityRules {
    /// Load rules from a TOML file. Missing sections take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&content).map_err(|e| {
            Error::InvalidData(format!(
                "failed to parse deity rules from {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load from `path` when given, otherwise the built-in rules.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Whether a normalized term is boilerplate.
    #[must_use]
    pub fn is_skipped(&self, term: &str) -> bool {
        self.skip_terms.iter().any(|s| s == term)
    }

    /// The canonical spelling for a variant, if it has one.
    #[must_use]
    pub fn alias_for(&self, term: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|a| a.from == term)
            .map(|a| a.to.as_str())
    }

    /// Canonical spelling of `term`, or `term` itself.
    #[must_use]
    pub fn canonicalize<'a>(&'a self, term: &'a str) -> &'a str {
        self.alias_for(term).unwrap_or(term)
    }

    #[must_use]
    pub fn is_excluded(&self, term: &str) -> bool {
        self.primary.exclusions.iter().any(|e| e == term)
    }
}
