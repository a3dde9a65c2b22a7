use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use sukta_core::model::{HymnId, HymnVector, Namespace};
use sukta_core::schema::Database;
use sukta_etl::Config;
use sukta_search::{Neighbor, NeighborService, QueryOptions, Summaries};

/// Open the neighbor service, failing early on an inconsistent store.
pub fn open_service(db_path: &Path, config: &Config) -> Result<NeighborService> {
    let db = Database::open(db_path).context("Failed to open database")?;
    let options = QueryOptions {
        diverse_pool: config.query.diverse_pool,
        diverse_base: config.query.diverse_base,
        cache_capacity: config.query.cache_capacity,
    };
    NeighborService::new(db, options).context(
        "Stored vectors do not match the stored vocabulary; run 'sukta build' to rebuild",
    )
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_neighbors(service: &NeighborService, neighbors: &[Neighbor]) -> Result<()> {
    if neighbors.is_empty() {
        println!("  (no neighbors)");
        return Ok(());
    }
    for (rank, neighbor) in neighbors.iter().enumerate() {
        let title = service
            .get_hymn_vector(&neighbor.hymn_id)?
            .map(|h| h.title)
            .unwrap_or_default();
        println!(
            "  {:>2}. {:>5}  {:.4}  {}",
            rank + 1,
            neighbor.hymn_id,
            neighbor.similarity,
            title
        );
    }
    Ok(())
}

pub fn neighbors(
    db_path: &Path,
    hymn: &str,
    namespace: Namespace,
    k: Option<usize>,
    min: Option<f64>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let service = open_service(db_path, config)?;
    let id = HymnId::from(hymn);
    let neighbors = match min {
        Some(min) => service.neighbors_above(&id, namespace, min)?,
        None => service.top_similar(&id, namespace, k.unwrap_or(config.query.default_k))?,
    };

    if json {
        return print_json(&neighbors);
    }
    println!("\nNeighbors of hymn {id} ({namespace}):\n");
    print_neighbors(&service, &neighbors)
}

pub fn diverse(
    db_path: &Path,
    hymn: &str,
    k: Option<usize>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let service = open_service(db_path, config)?;
    let summaries = Summaries::load_optional(config.summaries_path.as_deref())
        .context("Failed to load hymn summaries")?;
    let id = HymnId::from(hymn);

    let hood = match service.neighborhood(&id, k.unwrap_or(config.query.default_k), &summaries) {
        Ok(hood) => hood,
        Err(e) if e.is_not_found() => anyhow::bail!("Hymn {id} not found"),
        Err(e) => return Err(e.into()),
    };

    if json {
        return print_json(&hood);
    }

    println!("\n{}", hood.hymn.title);
    println!(
        "  Book {}, Hymn {}  ·  primary deity: {}",
        hood.hymn.book_number,
        hood.hymn.hymn_number,
        hood.primary_deity.as_deref().unwrap_or("<none>")
    );
    if let Some(summary) = &hood.summary {
        println!("  {summary}");
    }
    println!("\nDiverse neighbors:\n");
    if hood.neighbors.is_empty() {
        println!("  (no neighbors)");
    }
    for (rank, n) in hood.neighbors.iter().enumerate() {
        println!(
            "  {:>2}. {:>5}  {:.4}  [{}]  {}",
            rank + 1,
            n.hymn.hymn_id,
            n.similarity,
            n.primary_deity.as_deref().unwrap_or("-"),
            n.hymn.title
        );
        if let Some(summary) = &n.summary {
            println!("        {summary}");
        }
    }
    Ok(())
}

pub fn hymn(db_path: &Path, hymn: &str, json: bool, config: &Config) -> Result<()> {
    let service = open_service(db_path, config)?;
    let id = HymnId::from(hymn);
    let Some(vector) = service.get_hymn_vector(&id)? else {
        anyhow::bail!("Hymn {id} not found");
    };

    if json {
        return print_json(&vector);
    }
    print_hymn(&service, &vector);
    Ok(())
}

fn print_hymn(service: &NeighborService, hymn: &HymnVector) {
    let primary = hymn
        .primary_deity_id
        .and_then(|id| service.vocabulary().by_id(id))
        .map_or("<none>", |term| term.name.as_str());

    println!("\nHymn {}: {}", hymn.hymn_id, hymn.title);
    println!("  Book: {}  Hymn: {}", hymn.book_number, hymn.hymn_number);
    println!("  Deities ({}): {}", hymn.deity_count, hymn.deity_names.join(", "));
    println!("  Primary deity: {primary}");
    println!("  Hymn score: {:.1}", hymn.hymn_score);
    println!("  Words: {}", hymn.word_count);
}

pub fn pair(
    db_path: &Path,
    a: &str,
    b: &str,
    namespace: Namespace,
    config: &Config,
) -> Result<()> {
    let service = open_service(db_path, config)?;
    match service.pair_similarity(&HymnId::from(a), &HymnId::from(b), namespace)? {
        Some(similarity) => println!("{similarity:.6}"),
        None => println!("No {namespace} edge between {a} and {b}"),
    }
    Ok(())
}

pub fn top_pairs(
    db_path: &Path,
    namespace: Namespace,
    min: Option<f64>,
    limit: usize,
    json: bool,
    config: &Config,
) -> Result<()> {
    let service = open_service(db_path, config)?;
    let pairs = service.top_pairs(namespace, min, limit)?;

    if json {
        return print_json(&pairs);
    }
    println!("\nTop {namespace} pairs:\n");
    for (rank, edge) in pairs.iter().enumerate() {
        println!(
            "  {:>3}. {:>5} – {:<5}  {:.4}",
            rank + 1,
            edge.hymn1,
            edge.hymn2,
            edge.similarity
        );
    }
    Ok(())
}
