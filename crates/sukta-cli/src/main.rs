use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use sukta_core::model::{Metric, Namespace};
use sukta_etl::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sukta", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/sukta/sukta.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Rebuild vocabulary, vectors, assignments and similarity edges
    ///
    /// Runs the full pipeline over the raw corpus:
    ///
    /// - Parses hymn titles into deity terms and builds the vocabulary,
    ///   ordered by how many titles name each deity
    /// - Encodes every hymn as a binary deity vector
    /// - Assigns each hymn a primary deity
    /// - Scores every pair of hymns with each configured metric and keeps
    ///   the pairs at or above `similarity.min_similarity`
    ///
    /// The vocabulary and vectors are swapped in atomically under a new
    /// generation id; edges computed against the previous generation are
    /// cleared. Imported semantic edges are kept.
    Build {
        /// Raw corpus JSON (default: `corpus_path` from the config)
        #[arg(long)]
        corpus: Option<PathBuf>,
    },
    /// Build the vocabulary and hymn vectors only
    Vectorize {
        #[arg(long)]
        corpus: Option<PathBuf>,
    },
    /// Assign primary deities to the stored hymns
    Assign,
    /// Replace top deity frequencies with full-corpus mention counts
    Recount {
        /// How many deities to recount (default: rules `primary.top_n`)
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Compute similarity edges for one or more metrics
    Similarity {
        /// Metric to compute; repeatable (default: config `similarity.metrics`)
        #[arg(long = "metric", short = 'm')]
        metrics: Vec<Metric>,

        /// Keep pairs scoring at least this (default: config)
        #[arg(long, conflicts_with = "all")]
        min: Option<f64>,

        /// Keep every pair
        #[arg(long)]
        all: bool,
    },
    /// Replace the semantic namespace with externally computed similarities
    ImportSemantic {
        /// JSON array of `{hymn1_id, hymn2_id, similarity}`
        path: PathBuf,
    },
    /// Most similar hymns in one namespace
    Neighbors {
        hymn: String,

        #[arg(long, short = 'n', default_value = "cosine")]
        namespace: Namespace,

        #[arg(short = 'k')]
        k: Option<usize>,

        /// Every neighbor at or above this score instead of the top k
        #[arg(long)]
        min: Option<f64>,

        #[arg(long)]
        json: bool,
    },
    /// A hymn with neighbors drawn from different primary deities
    Diverse {
        hymn: String,

        #[arg(short = 'k')]
        k: Option<usize>,

        #[arg(long)]
        json: bool,
    },
    /// Show a hymn's vector row
    Hymn {
        hymn: String,

        #[arg(long)]
        json: bool,
    },
    /// Stored score of one pair of hymns
    Pair {
        a: String,
        b: String,

        #[arg(long, short = 'n', default_value = "cosine")]
        namespace: Namespace,
    },
    /// Highest-scoring pairs in a namespace
    TopPairs {
        #[arg(long, short = 'n', default_value = "cosine")]
        namespace: Namespace,

        #[arg(long)]
        min: Option<f64>,

        #[arg(long, default_value_t = 20)]
        limit: usize,

        #[arg(long)]
        json: bool,
    },
    /// Show vocabulary, vector and edge statistics
    Status {
        /// Rows shown in the ranked lists
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Graph views of the stored data
    Graph {
        #[command(subcommand)]
        action: GraphAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage deity rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum GraphAction {
    /// Components and hubs of a hymn similarity graph
    Hymns {
        #[arg(long, short = 'n', default_value = "cosine")]
        namespace: Namespace,

        /// Drop edges below this score
        #[arg(long)]
        min: Option<f64>,

        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Deities that share hymns
    Deities {
        /// Keep pairs sharing more than this many hymns
        #[arg(long, default_value_t = 5)]
        min_weight: u32,

        #[arg(long, default_value_t = 20)]
        top: usize,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print one value, or the whole config file
    Get { key: Option<String> },
    /// Set a value in the config file
    Set { key: String, value: String },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

#[derive(Debug, clap::Subcommand)]
enum RulesAction {
    /// Write the built-in deity rules to a file
    Init,
    /// Print the rules file path
    Path,
    /// Open the rules file in $EDITOR
    Edit,
    /// Check the rules file
    Validate,
    /// Print the rules in effect
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.db {
        Some(db) => Config::load_with_db_path(db)?,
        None => Config::load()?,
    };

    let _logger = twyg::setup(config.logging.clone())
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {e}"))?;

    let db_path = config.database_path.clone();

    // Ensure database directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    match cli.command {
        Commands::Build { corpus } => {
            let corpus = corpus.map_or_else(|| config.require_corpus_path(), Ok)?;
            commands::run_build(corpus, db_path, &config).await?;
        }
        Commands::Vectorize { corpus } => {
            let corpus = corpus.map_or_else(|| config.require_corpus_path(), Ok)?;
            commands::build::vectorize(&corpus, &db_path, &config)?;
        }
        Commands::Assign => commands::build::assign(&db_path, &config)?,
        Commands::Recount { top_n } => commands::build::recount(&db_path, top_n, &config)?,
        Commands::Similarity { metrics, min, all } => {
            let min = if all {
                None
            } else {
                Some(min.unwrap_or(config.similarity.min_similarity))
            };
            commands::build::similarity(&db_path, metrics, min, &config)?;
        }
        Commands::ImportSemantic { path } => commands::build::import_semantic(&path, &db_path)?,
        Commands::Neighbors {
            hymn,
            namespace,
            k,
            min,
            json,
        } => commands::query::neighbors(&db_path, &hymn, namespace, k, min, json, &config)?,
        Commands::Diverse { hymn, k, json } => {
            commands::query::diverse(&db_path, &hymn, k, json, &config)?;
        }
        Commands::Hymn { hymn, json } => commands::query::hymn(&db_path, &hymn, json, &config)?,
        Commands::Pair { a, b, namespace } => {
            commands::query::pair(&db_path, &a, &b, namespace, &config)?;
        }
        Commands::TopPairs {
            namespace,
            min,
            limit,
            json,
        } => commands::query::top_pairs(&db_path, namespace, min, limit, json, &config)?,
        Commands::Status { top } => commands::show_status(&db_path, top)?,
        Commands::Graph { action } => match action {
            GraphAction::Hymns {
                namespace,
                min,
                top,
            } => commands::graph::show_hymn_graph(&db_path, namespace, min, top)?,
            GraphAction::Deities { min_weight, top } => {
                commands::graph::show_deity_graph(&db_path, min_weight, top)?;
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Get { key } => commands::config::get_config(key, &config)?,
            ConfigAction::Set { key, value } => commands::config::set_config(key, value)?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config()?,
        },
        Commands::Rules { action } => match action {
            RulesAction::Init => commands::rules::init_rules(&config)?,
            RulesAction::Path => commands::rules::show_path(&config)?,
            RulesAction::Edit => commands::rules::edit_rules(&config)?,
            RulesAction::Validate => commands::rules::validate_rules(&config)?,
            RulesAction::Show => commands::rules::show_rules(&config)?,
        },
    }

    Ok(())
}
