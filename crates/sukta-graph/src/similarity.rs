use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use sukta_core::model::{HymnId, Namespace, SimilarityEdge};

/// A hymn's degree in a similarity graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Centrality {
    pub hymn_id: HymnId,
    pub degree: usize,
    /// Degree divided by the number of other hymns.
    pub centrality: f64,
}

/// Undirected hymn graph: one node per hymn, one weighted edge per stored
/// pair at or above the threshold.
#[derive(Debug, Clone)]
pub struct SimilarityGraph {
    namespace: Namespace,
    graph: UnGraph<HymnId, f64>,
    index: HashMap<HymnId, NodeIndex>,
}

impl SimilarityGraph {
    /// Build from every hymn id plus the namespace's edges. Hymns with no
    /// qualifying edge stay as isolated nodes; edge endpoints missing from
    /// `hymns` are added.
    pub fn from_edges(
        namespace: Namespace,
        hymns: impl IntoIterator<Item = HymnId>,
        edges: &[SimilarityEdge],
        min_similarity: Option<f64>,
    ) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut index = HashMap::new();

        for hymn in hymns {
            index
                .entry(hymn.clone())
                .or_insert_with(|| graph.add_node(hymn));
        }

        for edge in edges {
            if min_similarity.is_some_and(|min| edge.similarity < min) {
                continue;
            }
            let a = *index
                .entry(edge.hymn1.clone())
                .or_insert_with(|| graph.add_node(edge.hymn1.clone()));
            let b = *index
                .entry(edge.hymn2.clone())
                .or_insert_with(|| graph.add_node(edge.hymn2.clone()));
            graph.add_edge(a, b, edge.similarity);
        }

        log::debug!(
            "Built {} graph: {} hymns, {} edges",
            namespace,
            graph.node_count(),
            graph.edge_count()
        );

        Self {
            namespace,
            graph,
            index,
        }
    }

    pub const fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Connected components, largest first; members sorted by id.
    pub fn components(&self) -> Vec<Vec<HymnId>> {
        let mut sets = UnionFind::new(self.graph.node_count());
        for edge in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                sets.union(a.index(), b.index());
            }
        }

        let mut groups: BTreeMap<usize, Vec<HymnId>> = BTreeMap::new();
        for node in self.graph.node_indices() {
            groups
                .entry(sets.find(node.index()))
                .or_default()
                .push(self.graph[node].clone());
        }

        let mut components: Vec<Vec<HymnId>> = groups
            .into_values()
            .map(|mut members| {
                members.sort();
                members
            })
            .collect();
        components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        components
    }

    pub fn component_count(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    /// Degree centrality of every hymn, most connected first.
    #[allow(clippy::cast_precision_loss)]
    pub fn degree_centrality(&self) -> Vec<Centrality> {
        let others = self.graph.node_count().saturating_sub(1);
        let mut ranked: Vec<Centrality> = self
            .graph
            .node_indices()
            .map(|node| {
                let degree = self.graph.edges(node).count();
                Centrality {
                    hymn_id: self.graph[node].clone(),
                    degree,
                    centrality: if others == 0 {
                        0.0
                    } else {
                        degree as f64 / others as f64
                    },
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.hymn_id.cmp(&b.hymn_id)));
        ranked
    }

    /// Adjacent hymns with their edge weights, highest first.
    pub fn neighbors(&self, id: &HymnId) -> Vec<(HymnId, f64)> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut adjacent: Vec<(HymnId, f64)> = self
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
        adjacent.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        adjacent
    }
}
