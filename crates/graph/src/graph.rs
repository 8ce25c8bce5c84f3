use crate::error::{GraphError, Result};
use crate::types::DepGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use std::collections::{BTreeSet, HashSet, VecDeque};

impl DepGraph {
    /// Neighbors in one direction, sorted by insertion order
    fn sorted_neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> =
            self.graph.neighbors_directed(node, direction).collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    fn names_of(&self, nodes: Vec<NodeIndex>) -> Vec<&str> {
        nodes.into_iter().filter_map(|idx| self.name(idx)).collect()
    }

    /// Direct targets of outgoing edges
    #[must_use]
    pub fn successors(&self, name: &str) -> Vec<&str> {
        self.find_node(name)
            .map(|idx| self.names_of(self.sorted_neighbors(idx, Direction::Outgoing)))
            .unwrap_or_default()
    }

    /// Direct sources of incoming edges
    #[must_use]
    pub fn predecessors(&self, name: &str) -> Vec<&str> {
        self.find_node(name)
            .map(|idx| self.names_of(self.sorted_neighbors(idx, Direction::Incoming)))
            .unwrap_or_default()
    }

    /// Topological order (Kahn's algorithm)
    ///
    /// Sources come before their targets unless `reverse` is set. Nodes that
    /// become ready at the same time are emitted in insertion order.
    pub fn topological_order(&self, reverse: bool) -> Result<Vec<String>> {
        let total = self.graph.node_count();
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.sorted_neighbors(idx, Direction::Incoming).len())
            .collect();

        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] == 0)
            .collect();
        let mut order = Vec::with_capacity(total);

        while let Some(current) = queue.pop_front() {
            order.push(current);
            for next in self.sorted_neighbors(current, Direction::Outgoing) {
                let degree = &mut in_degree[next.index()];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() != total {
            return Err(GraphError::Cycle {
                emitted: order.len(),
                total,
            });
        }

        if reverse {
            order.reverse();
        }
        Ok(order
            .into_iter()
            .filter_map(|idx| self.name(idx).map(str::to_string))
            .collect())
    }

    /// Whether adding `src -> dst` would close a cycle
    ///
    /// True when `src` is reachable from `dst` (or both are the same node).
    #[must_use]
    pub fn would_create_cycle(&self, src: &str, dst: &str) -> bool {
        if src == dst {
            return true;
        }
        let (Some(start), Some(goal)) = (self.find_node(dst), self.find_node(src)) else {
            return false;
        };

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if !visited.contains(&next) {
                    queue.push_back(next);
                }
            }
        }

        false
    }

    /// Every node reachable from `name` over outgoing edges, excluding `name`
    #[must_use]
    pub fn transitive_successors(&self, name: &str) -> BTreeSet<String> {
        self.reachable(name, Direction::Outgoing)
    }

    /// Every node that reaches `name`, excluding `name`
    #[must_use]
    pub fn transitive_predecessors(&self, name: &str) -> BTreeSet<String> {
        self.reachable(name, Direction::Incoming)
    }

    fn reachable(&self, name: &str, direction: Direction) -> BTreeSet<String> {
        let Some(start) = self.find_node(name) else {
            return BTreeSet::new();
        };

        let mut seen = HashSet::from([start]);
        let mut result = BTreeSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for next in self.graph.neighbors_directed(current, direction) {
                if seen.insert(next) {
                    if let Some(label) = self.name(next) {
                        result.insert(label.to_string());
                    }
                    queue.push_back(next);
                }
            }
        }

        result
    }

    /// Position of every node in the topological order, or `None` on a cycle
    #[must_use]
    pub fn rank(&self, reverse: bool) -> Option<Vec<(String, usize)>> {
        self.topological_order(reverse).ok().map(|order| {
            order
                .into_iter()
                .enumerate()
                .map(|(position, name)| (name, position))
                .collect()
        })
    }
}
