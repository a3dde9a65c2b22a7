use anyhow::{Context, Result};
use std::path::Path;

use sukta_core::model::Namespace;
use sukta_core::schema::{Database, BUCKET_BOUNDS};

pub fn show_status(db_path: &Path, top: usize) -> Result<()> {
    let db = Database::open(db_path).context("Failed to open database")?;

    println!("\n📊 Sukta Status\n");
    println!("  Database: {}", db_path.display());

    let Some(info) = db.vocabulary_info()? else {
        println!("  Vocabulary: not built");
        println!("\n  Run `sukta build` to build the vocabulary and edges");
        return Ok(());
    };

    println!("  Vocabulary: {} deities", info.deity_count);
    println!("    generation {} built {}", info.generation, info.built_at);
    match db.verify_vocabulary_consistency() {
        Ok(_) => println!("    vectors consistent ✓"),
        Err(e) => println!("    ✗ {e}"),
    }

    let stats = db.vector_stats()?;
    println!("\n  Hymns: {}", stats.hymns);
    println!("    with no deity: {}", stats.zero_vectors);
    println!("    with a primary deity: {}", stats.assigned);
    println!(
        "    deities per hymn: min {} / mean {:.2} / max {}",
        stats.min_deity_count, stats.mean_deity_count, stats.max_deity_count
    );
    println!(
        "    hymn score: mean {:.1} / max {:.1}",
        stats.mean_hymn_score, stats.max_hymn_score
    );

    println!("\n  Top hymns by score:");
    for hymn in db.top_hymns_by_score(top)? {
        println!(
            "    {:>5}  {:>8.1}  {}",
            hymn.hymn_id, hymn.hymn_score, hymn.title
        );
    }

    let distribution = db.primary_deity_distribution()?;
    if !distribution.is_empty() {
        println!("\n  Primary deities:");
        for share in distribution.iter().take(top) {
            println!(
                "    {:<16} {:>5} hymns  (frequency {})",
                share.deity_name, share.hymn_count, share.frequency
            );
        }
    }

    let [low, mid, high] = BUCKET_BOUNDS;
    println!("\n  Similarity namespaces:");
    for namespace in Namespace::ALL {
        let edges = db.edge_stats(namespace)?;
        if edges.count == 0 {
            println!("    {:<9} (empty)", namespace.name());
            continue;
        }
        println!(
            "    {:<9} {:>8} edges  min {:.3}  mean {:.3}  max {:.3}",
            namespace.name(),
            edges.count,
            edges.min.unwrap_or_default(),
            edges.mean.unwrap_or_default(),
            edges.max.unwrap_or_default()
        );
        println!(
            "              <{low}: {}  {low}-{mid}: {}  {mid}-{high}: {}  >={high}: {}",
            edges.buckets[0], edges.buckets[1], edges.buckets[2], edges.buckets[3]
        );
    }

    Ok(())
}
