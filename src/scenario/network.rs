//! Road network graph for connectivity analysis
//!
//! Built from a snapshot on demand. Edges whose endpoints do not resolve are
//! left out of the graph; the validator reports those separately.

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use super::store::EntityStore;
use super::types::{EdgeId, NodeId};

/// Directed graph of nodes joined by edges
#[derive(Default)]
pub struct RoadGraph {
    graph: DiGraph<NodeId, EdgeId>,

    /// Maps node identifiers to their index in the graph
    node_to_index: HashMap<NodeId, NodeIndex>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from every node and every resolvable edge in the store
    pub fn from_store(store: &EntityStore) -> Self {
        let mut network = Self::new();

        for node in store.nodes.list() {
            network.add_node(node.id.clone());
        }

        for edge in store.edges.list() {
            let resolved = store.nodes.contains(edge.from.as_str())
                && store.nodes.contains(edge.to.as_str());
            if !resolved {
                continue;
            }
            let from = network.add_node(edge.from.clone());
            let to = network.add_node(edge.to.clone());
            network.graph.add_edge(from, to, edge.id.clone());
        }

        network
    }

    /// Adds a node to the graph if it isn't already present
    fn add_node(&mut self, node_id: NodeId) -> NodeIndex {
        if let Some(index) = self.node_to_index.get(&node_id) {
            return *index;
        }

        let index = self.graph.add_node(node_id.clone());
        self.node_to_index.insert(node_id, index);
        index
    }

    /// Whether `end` can be reached from `start` along directed edges
    ///
    /// A node always reaches itself; unknown nodes reach nothing.
    pub fn is_reachable(&self, start: &NodeId, end: &NodeId) -> bool {
        match (self.node_to_index.get(start), self.node_to_index.get(end)) {
            (Some(&start), Some(&end)) => has_path_connecting(&self.graph, start, end, None),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
