use anyhow::{Context, Result};
use std::path::Path;

use sukta_core::model::Namespace;
use sukta_core::schema::Database;
use sukta_graph::{DeityCooccurrence, SimilarityGraph};

pub fn show_hymn_graph(
    db_path: &Path,
    namespace: Namespace,
    min: Option<f64>,
    top: usize,
) -> Result<()> {
    let db = Database::open(db_path).context("Failed to open database")?;
    let hymns = db.list_hymn_vectors()?.into_iter().map(|h| h.hymn_id);
    let edges = db.list_edges(namespace)?;
    let graph = SimilarityGraph::from_edges(namespace, hymns, &edges, min);

    let components = graph.components();
    println!("\n🕸  {namespace} similarity graph\n");
    println!("  Hymns: {}", graph.node_count());
    println!("  Edges: {}", graph.edge_count());
    println!("  Connected components: {}", components.len());
    println!(
        "  Isolated hymns: {}",
        components.iter().filter(|c| c.len() == 1).count()
    );
    if let Some(largest) = components.first() {
        println!("  Largest component: {} hymns", largest.len());
    }

    println!("\n  Most connected hymns:");
    for hub in graph.degree_centrality().into_iter().take(top) {
        println!(
            "    {:>5}  degree {:>5}  centrality {:.4}",
            hub.hymn_id, hub.degree, hub.centrality
        );
    }
    Ok(())
}

pub fn show_deity_graph(db_path: &Path, min_weight: u32, top: usize) -> Result<()> {
    let db = Database::open(db_path).context("Failed to open database")?;
    let vocabulary = db
        .load_vocabulary()?
        .ok_or_else(|| anyhow::anyhow!("No vocabulary built; run 'sukta build' first"))?;
    let vectors = db.list_hymn_vectors()?;
    let graph = DeityCooccurrence::from_vectors(&vocabulary, &vectors, min_weight);

    println!("\n🕸  Deity co-occurrence (more than {min_weight} shared hymns)\n");
    println!("  Deities: {}", graph.deity_count());
    println!("  Pairs: {}", graph.pair_count());
    println!("\n  Strongest pairs:");
    for edge in graph.strongest(top) {
        println!(
            "    {:<16} {:<16} {:>5} hymns",
            edge.deity1, edge.deity2, edge.hymns
        );
    }
    Ok(())
}
