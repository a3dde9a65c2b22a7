use anyhow::{Context, Result};
use sukta_etl::{config, Config};
use toml_edit::{DocumentMut, Item, Value};

/// Keys accepted by `config get` and `config set`.
const KEYS: &[&str] = &[
    "database_path",
    "corpus_path",
    "summaries_path",
    "rules_path",
    "similarity.min_similarity",
    "similarity.metrics",
    "query.default_k",
    "query.diverse_pool",
    "query.diverse_base",
    "query.cache_capacity",
];

fn check_key(key: &str) -> Result<()> {
    if KEYS.contains(&key) {
        Ok(())
    } else {
        anyhow::bail!("Unknown config key: {}\n\nValid keys: {}", key, KEYS.join(", "))
    }
}

/// Show the current effective configuration.
pub fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    let path_or_unset = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map_or_else(|| "<not set>".to_string(), |p| p.display().to_string())
    };

    println!("Settings:");
    println!("  database_path: {}", config.database_path.display());
    println!("  corpus_path: {}", path_or_unset(&config.corpus_path));
    println!("  summaries_path: {}", path_or_unset(&config.summaries_path));
    println!("  rules_path: {}", path_or_unset(&config.rules_path));
    println!("  similarity.min_similarity: {}", config.similarity.min_similarity);
    println!(
        "  similarity.metrics: {}",
        config
            .similarity
            .metrics
            .iter()
            .map(|m| m.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  query.default_k: {}", config.query.default_k);
    println!("  query.diverse_pool: {}", config.query.diverse_pool);
    println!("  query.diverse_base: {}", config.query.diverse_base);
    println!("  query.cache_capacity: {}", config.query.cache_capacity);
    println!("  logging.level: {:?}", config.logging.level());
    println!("  logging.coloured: {}", config.logging.coloured());
    println!("  logging.output: {:?}", config.logging.output());

    println!("\nPriority: CLI args > ENV vars (SUKTA_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value, or print the whole config file.
pub fn get_config(key: Option<String>, config: &Config) -> Result<()> {
    if let Some(key) = key {
        check_key(&key)?;
        let tree = serde_json::to_value(config)?;
        let pointer = format!("/{}", key.replace('.', "/"));
        match tree.pointer(&pointer) {
            None | Some(serde_json::Value::Null) => println!("<not set>"),
            Some(serde_json::Value::String(s)) => println!("{s}"),
            Some(other) => println!("{other}"),
        }
    } else {
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'sukta config init' to create it.");
        }
    }

    Ok(())
}

/// Set a config value, keeping the rest of the file (comments included).
pub fn set_config(key: String, value: String) -> Result<()> {
    let config_path = config::config_file_path();

    config::ensure_config_file()?;
    let contents = std::fs::read_to_string(&config_path).context("Failed to read config file")?;

    let updated = apply_setting(&contents, &key, &value)?;

    std::fs::write(&config_path, updated).context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, value);
    println!("  in {}", config_path.display());

    Ok(())
}

/// Return `contents` with `key` set to `value`. Path keys are always
/// strings; anything else is read as a TOML literal when it parses as one.
fn apply_setting(contents: &str, key: &str, value: &str) -> Result<String> {
    check_key(key)?;

    let mut doc: DocumentMut = contents.parse().context("Config file is not valid TOML")?;
    let parsed = if key.ends_with("_path") {
        Value::from(value)
    } else {
        value.parse::<Value>().unwrap_or_else(|_| Value::from(value))
    };

    let (tables, leaf) = match key.rsplit_once('.') {
        Some((tables, leaf)) => (Some(tables), leaf),
        None => (None, key),
    };
    let mut table = doc.as_table_mut();
    for part in tables.into_iter().flat_map(|t| t.split('.')) {
        table = table
            .entry(part)
            .or_insert(toml_edit::table())
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("'{part}' in the config file is not a table"))?;
    }
    table.insert(leaf, Item::Value(parsed));

    let updated = doc.to_string();
    toml::from_str::<Config>(&updated)
        .with_context(|| format!("Invalid value for {key}: {value}"))?;
    Ok(updated)
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    let config_path = config::config_file_path();
    println!("{}", config_path.display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure sukta.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sukta_core::model::{Metric, Namespace};

    #[test]
    fn test_set_top_level_path() {
        let updated =
            apply_setting(config::example_config(), "corpus_path", "/data/rigveda.json").unwrap();
        let parsed: Config = toml::from_str(&updated).unwrap();
        assert_eq!(
            parsed.corpus_path,
            Some(std::path::PathBuf::from("/data/rigveda.json"))
        );
        // comments survive
        assert!(updated.contains("# Sukta Configuration File"));
    }

    #[test]
    fn test_set_nested_values() {
        let updated = apply_setting("", "query.default_k", "8").unwrap();
        let updated = apply_setting(&updated, "query.diverse_base", "jaccard").unwrap();
        let updated = apply_setting(&updated, "similarity.metrics", r#"["dice"]"#).unwrap();

        let parsed: Config = toml::from_str(&updated).unwrap();
        assert_eq!(parsed.query.default_k, 8);
        assert_eq!(parsed.query.diverse_base, Namespace::Jaccard);
        assert_eq!(parsed.similarity.metrics, vec![Metric::Dice]);
    }

    #[test]
    fn test_rejects_unknown_key() {
        assert!(apply_setting("", "vocabulary_size", "x").is_err());
    }

    #[test]
    fn test_rejects_ill_typed_value() {
        assert!(apply_setting("", "query.default_k", "many").is_err());
        assert!(apply_setting("", "similarity.metrics", r#"["euclid"]"#).is_err());
    }
}
