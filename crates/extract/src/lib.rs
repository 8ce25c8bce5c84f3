//! # Proof Context Extraction
//!
//! Builds per-symbol dependency records for a project of proof scripts.
//!
//! ## Pipeline
//!
//! ```text
//! file graph ──> topological order (dependencies first)
//!     │
//!     ├──> per file, per statement
//!     │    ├─> definitions, class fields, notations
//!     │    ├─> Require / Import / Export ──> import watches, exports
//!     │    ├─> qualified references ──> resolver ──> cross-file edges
//!     │    └─> unqualified references ──> pending
//!     │
//!     ├──> symbol graph closure ──> in-file dependencies
//!     ├──> export propagation (transitive re-exports)
//!     └──> pending references ──> watched files ──> cross-file edges
//! ```
//!
//! The result is a read-only [`DependencyIndex`].

mod config;
mod error;
mod imports;
mod index;
mod pipeline;
mod source;

pub use config::ExtractConfig;
pub use error::{ExtractError, Result};
pub use imports::{parse_import, ImportStatement};
pub use index::{Dependencies, DependencyIndex, FileTable, IndexStats, SymbolEntry, SymbolKey};
pub use pipeline::DependencyExtractor;
pub use source::{ArtifactSources, InMemorySources, SourceProvider};
