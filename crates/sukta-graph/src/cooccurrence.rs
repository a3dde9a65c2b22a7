//! Deity co-occurrence: which deities are praised in the same hymns.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::BTreeMap;

use sukta_core::model::{HymnVector, Vocabulary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CooccurrenceEdge {
    pub deity1: String,
    pub deity2: String,
    /// Hymns in which both deities appear.
    pub hymns: u32,
}

/// Weighted deity graph built from hymn vectors. Every vocabulary term is
/// a node; two deities are joined when they share more than `min_weight`
/// hymns.
#[derive(Debug, Clone)]
pub struct DeityCooccurrence {
    graph: UnGraph<String, u32>,
    nodes: Vec<NodeIndex>,
}

impl DeityCooccurrence {
    pub fn from_vectors(vocabulary: &Vocabulary, vectors: &[HymnVector], min_weight: u32) -> Self {
        let mut graph = UnGraph::new_undirected();
        let nodes: Vec<NodeIndex> = vocabulary
            .terms()
            .iter()
            .map(|term| graph.add_node(term.name.clone()))
            .collect();

        let mut counts: BTreeMap<(usize, usize), u32> = BTreeMap::new();
        for hymn in vectors {
            let present: Vec<usize> = hymn
                .vector
                .iter_ones()
                .filter(|&p| p < nodes.len())
                .collect();
            for (i, &a) in present.iter().enumerate() {
                for &b in &present[i + 1..] {
                    *counts.entry((a, b)).or_insert(0) += 1;
                }
            }
        }

        for ((a, b), weight) in counts {
            if weight > min_weight {
                graph.add_edge(nodes[a], nodes[b], weight);
            }
        }

        log::debug!(
            "Deity co-occurrence graph: {} deities, {} pairs above {}",
            graph.node_count(),
            graph.edge_count(),
            min_weight
        );

        Self { graph, nodes }
    }

    pub fn deity_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn pair_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The heaviest pairs, ties broken by name.
    pub fn strongest(&self, limit: usize) -> Vec<CooccurrenceEdge> {
        let mut edges: Vec<CooccurrenceEdge> = self
            .graph
            .edge_references()
            .map(|edge| {
                let (a, b) = (&self.graph[edge.source()], &self.graph[edge.target()]);
                let (deity1, deity2) = if a <= b { (a, b) } else { (b, a) };
                CooccurrenceEdge {
                    deity1: deity1.clone(),
                    deity2: deity2.clone(),
                    hymns: *edge.weight(),
                }
            })
            .collect();
        edges.sort_by(|x, y| {
            y.hymns
                .cmp(&x.hymns)
                .then_with(|| x.deity1.cmp(&y.deity1))
                .then_with(|| x.deity2.cmp(&y.deity2))
        });
        edges.truncate(limit);
        edges
    }

    /// Deities sharing hymns with the one at vector `position`, heaviest first.
    pub fn partners(&self, position: usize) -> Vec<(String, u32)> {
        let Some(&node) = self.nodes.get(position) else {
            return Vec::new();
        };
        let mut partners: Vec<(String, u32)> = self
            .graph
            .edges(node)
            .map(|edge| {
                let other = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                (self.graph[other].clone(), *edge.weight())
            })
            .collect();
        partners.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        partners
    }
}
