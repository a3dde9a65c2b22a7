use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use sukta_core::model::{Metric, Namespace};
use sukta_core::rules::DeityRules;

/// Configuration for sukta.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (SUKTA_* prefix)
/// 3. Config file (~/.config/sukta/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: SUKTA_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/sukta/sukta.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Raw corpus JSON produced by the scraper.
    #[serde(default)]
    pub corpus_path: Option<PathBuf>,

    /// Optional `{ hymn_id: summary }` JSON shown alongside neighbors.
    #[serde(default)]
    pub summaries_path: Option<PathBuf>,

    /// Optional deity rules TOML; built-in rules when unset.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    #[serde(default)]
    pub similarity: SimilarityConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub logging: twyg::Opts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Pairs scoring below this are not stored.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,

    /// Metrics computed by `sukta build`.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            metrics: default_metrics(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Candidate pool size for diverse neighbor selection.
    #[serde(default = "default_diverse_pool")]
    pub diverse_pool: usize,

    /// Namespace the diverse candidate pool is drawn from.
    #[serde(default = "default_diverse_base")]
    pub diverse_base: Namespace,

    /// Maximum cached diverse results.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            diverse_pool: default_diverse_pool(),
            diverse_base: default_diverse_base(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            corpus_path: None,
            summaries_path: None,
            rules_path: None,
            similarity: SimilarityConfig::default(),
            query: QueryConfig::default(),
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/sukta/config.toml
    /// Reads environment variables with SUKTA_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("sukta");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with a custom database path (the --db CLI flag).
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }

    /// The deity rules named by `rules_path`, or the built-in set.
    pub fn deity_rules(&self) -> Result<DeityRules> {
        DeityRules::load_or_default(self.rules_path.as_deref()).with_context(|| {
            format!(
                "Failed to load deity rules from {}",
                self.rules_path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            )
        })
    }

    /// The corpus path, or an error telling the user how to set it.
    pub fn require_corpus_path(&self) -> Result<PathBuf> {
        self.corpus_path.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "No corpus configured. Pass --corpus, set SUKTA_CORPUS_PATH, \
                 or add corpus_path to {}",
                config_file_path().display()
            )
        })
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sukta")
        .join("sukta.db")
}

const fn default_min_similarity() -> f64 {
    0.3
}

fn default_metrics() -> Vec<Metric> {
    Metric::ALL.to_vec()
}

const fn default_k() -> usize {
    4
}

const fn default_diverse_pool() -> usize {
    50
}

const fn default_diverse_base() -> Namespace {
    Namespace::Cosine
}

const fn default_cache_capacity() -> usize {
    1024
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/sukta/config.toml
/// - macOS: ~/Library/Application Support/sukta/config.toml
/// - Windows: %APPDATA%\sukta\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sukta")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Sukta Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (SUKTA_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database holding the vocabulary, vectors and edges
#
# Can also be set via:
# - CLI: sukta --db /custom/path.db build
# - Environment: SUKTA_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/sukta.db"

# Raw corpus JSON ({ "books": { ... } })
#corpus_path = "/path/to/rigveda_data.json"

# Optional hymn summaries ({ "<hymn_id>": "summary" })
#summaries_path = "/path/to/hymn_summaries.json"

# Optional deity rules (skip list, aliases, primary-deity policy)
#rules_path = "/path/to/deity_rules.toml"

[similarity]
# Pairs scoring below this are not stored
min_similarity = 0.3
# Metrics computed by `sukta build`
metrics = ["cosine", "jaccard", "dice", "hamming"]

[query]
default_k = 4
# Candidate pool for diverse neighbor selection
diverse_pool = 50
diverse_base = "cosine"
# Maximum cached diverse results
cache_capacity = 1024

# Logger options (see the twyg crate); defaults apply when omitted
#[logging]
#coloured = true
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.database_path.as_os_str().is_empty());
        assert!(config.corpus_path.is_none());
        assert!((config.similarity.min_similarity - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.similarity.metrics.len(), 4);
        assert_eq!(config.query.default_k, 4);
        assert_eq!(config.query.diverse_pool, 50);
        assert_eq!(config.query.diverse_base, Namespace::Cosine);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.query.cache_capacity, 1024);
        assert_eq!(config.similarity.metrics, Metric::ALL.to_vec());
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let config: Config = toml::from_str("[query]\ndefault_k = 7\n").unwrap();
        assert_eq!(config.query.default_k, 7);
        assert_eq!(config.query.diverse_pool, 50);
        assert!((config.similarity.min_similarity - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_load() {
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_db_path() {
        let custom_path = PathBuf::from("/tmp/test.db");
        let config = Config::load_with_db_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().database_path, custom_path);
    }

    #[test]
    fn test_deity_rules_default_without_path() {
        let rules = Config::default().deity_rules().unwrap();
        assert_eq!(rules, DeityRules::default());
    }

    #[test]
    fn test_require_corpus_path() {
        let mut config = Config::default();
        assert!(config.require_corpus_path().is_err());
        config.corpus_path = Some(PathBuf::from("/tmp/corpus.json"));
        assert_eq!(
            config.require_corpus_path().unwrap(),
            PathBuf::from("/tmp/corpus.json")
        );
    }
}
