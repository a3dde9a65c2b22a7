use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use sukta_core::rules::DeityRules;
use sukta_etl::Config;

/// The rules file named in the config, or the platform default.
fn rules_path(config: &Config) -> Result<PathBuf> {
    if let Some(path) = &config.rules_path {
        return Ok(path.clone());
    }
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("sukta").join("deity_rules.toml"))
}

/// Write the built-in rules to the rules file.
pub fn init_rules(config: &Config) -> Result<()> {
    let rules_path = rules_path(config)?;

    if rules_path.exists() {
        println!("✓ Rules file already exists at: {}", rules_path.display());
        return Ok(());
    }

    if let Some(parent) = rules_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&rules_path, default_rules_toml()?)?;

    println!("✓ Created default rules file at: {}", rules_path.display());
    println!("\nNext steps:");
    println!("  1. Review the rules: sukta rules edit");
    println!("  2. Validate syntax: sukta rules validate");
    println!("  3. Point the config at it: sukta config set rules_path {}", rules_path.display());
    println!("  4. Rebuild: sukta build");

    Ok(())
}

pub fn show_path(config: &Config) -> Result<()> {
    println!("{}", rules_path(config)?.display());
    Ok(())
}

/// Open rules file in $EDITOR.
pub fn edit_rules(config: &Config) -> Result<()> {
    let rules_path = rules_path(config)?;

    if !rules_path.exists() {
        println!("Rules file not found: {}", rules_path.display());
        println!("\nRun 'sukta rules init' to create it first.");
        return Ok(());
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| {
        if cfg!(target_os = "macos") {
            "open".to_string()
        } else if cfg!(target_os = "windows") {
            "notepad".to_string()
        } else {
            "vi".to_string()
        }
    });

    Command::new(&editor)
        .arg(&rules_path)
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to open editor '{}': {}", editor, e))?;

    Ok(())
}

/// Validate rules file syntax.
pub fn validate_rules(config: &Config) -> Result<()> {
    let rules_path = rules_path(config)?;

    if !rules_path.exists() {
        println!("Rules file not found: {}", rules_path.display());
        println!("\nRun 'sukta rules init' to create it first.");
        return Ok(());
    }

    match DeityRules::load(&rules_path) {
        Ok(rules) => {
            println!("✓ Rules file is valid!");
            println!("\nSummary:");
            println!("  Skip terms:        {}", rules.skip_terms.len());
            println!("  Aliases:           {}", rules.aliases.len());
            println!("  Primary top-N:     {}", rules.primary.top_n);
            println!("  Exclusions:        {}", rules.primary.exclusions.len());
            println!(
                "  Default deity:     {}",
                rules.primary.default_deity.as_deref().unwrap_or("<most frequent>")
            );
        }
        Err(e) => {
            println!("✗ Rules file has errors:");
            println!("\n{}", e);
            println!("\nFix the errors and run 'sukta rules validate' again.");
        }
    }

    Ok(())
}

/// Print the rules in effect.
pub fn show_rules(config: &Config) -> Result<()> {
    let rules = config.deity_rules()?;
    print!(
        "{}",
        toml::to_string_pretty(&rules).context("Failed to render rules")?
    );
    Ok(())
}

fn default_rules_toml() -> Result<String> {
    let body = toml::to_string_pretty(&DeityRules::default()).context("Failed to render rules")?;
    Ok(format!(
        "# Sukta Deity Rules\n\
         #\n\
         # skip_terms: title tokens that never name a deity\n\
         # aliases: variant spellings folded into one vocabulary term\n\
         # primary: candidate set and fallback for primary-deity assignment\n\n{body}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_round_trip() {
        let text = default_rules_toml().unwrap();
        let parsed: DeityRules = toml::from_str(&text).unwrap();
        assert_eq!(parsed, DeityRules::default());
    }

    #[test]
    fn test_rules_path_prefers_config() {
        let config = Config {
            rules_path: Some(PathBuf::from("/etc/sukta/rules.toml")),
            ..Config::default()
        };
        assert_eq!(
            rules_path(&config).unwrap(),
            PathBuf::from("/etc/sukta/rules.toml")
        );
    }
}
