use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Directed graph over string names (file keys or symbol names)
///
/// Nodes are created on demand by [`DepGraph::add_edge`]. Self-loops never
/// persist and parallel edges collapse into one.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    /// Directed graph (name -> name)
    pub(crate) graph: DiGraph<String, ()>,

    /// Name -> NodeIndex mapping for fast lookup
    pub(crate) index: HashMap<String, NodeIndex>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add node to graph, returning the existing index when already present
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Add edge `src -> dst`, creating missing endpoints.
    ///
    /// Returns `false` when the edge was not stored: either it is a self-loop
    /// or it already exists.
    pub fn add_edge(&mut self, src: &str, dst: &str) -> bool {
        let from = self.add_node(src);
        let to = self.add_node(dst);
        if from == to {
            log::debug!("Ignoring self-loop on {src}");
            return false;
        }
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Add edge `src -> dst` unless it would close a cycle.
    ///
    /// Used for symbol graphs built from approximate external data: the
    /// conflicting edge is dropped with a warning and construction goes on.
    pub fn add_edge_acyclic(&mut self, src: &str, dst: &str) -> bool {
        if self.would_create_cycle(src, dst) {
            log::warn!("Dropping edge {src} -> {dst}: it would create a cycle");
            return false;
        }
        self.add_edge(src, dst)
    }

    /// Find node by name
    pub fn find_node(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Node name for an index
    pub fn name(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// All node names in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().filter_map(move |idx| self.name(idx))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
