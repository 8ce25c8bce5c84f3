//! # Proof Context Graph
//!
//! Name-keyed directed graphs for file and symbol dependencies.
//!
//! ## Features
//!
//! - **Deterministic topological order** - Kahn's algorithm, ties broken by insertion order
//! - **Cycle-safe insertion** - approximate edges that would close a cycle are dropped
//! - **Transitive closure** - BFS over outgoing edges for in-file dependency sets
//! - **DOT readers** - load the graphs emitted by external dependency tools
//!
//! ## Architecture
//!
//! ```text
//! coqdep DOT ──> parse_file_graph ──┐
//!                                   ├──> DepGraph (petgraph)
//! dpd2dot DOT ─> parse_symbol_graph ┘      ├─ Nodes: file keys or symbol names
//!                                          ├─ Edges: dependency relations
//!                                          └─ Queries: order, reachability, closure
//! ```
//!
//! File graphs point from a dependency to its dependent, so the non-reversed
//! topological order lists dependencies first. Symbol graphs point from a
//! symbol to the symbols it uses.

mod dot;
mod error;
mod graph;
mod types;

pub use dot::{parse_file_graph, parse_symbol_graph};
pub use error::{GraphError, Result};
pub use types::DepGraph;
