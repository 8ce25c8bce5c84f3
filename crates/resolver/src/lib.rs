//! # Proof Context Resolver
//!
//! Maps dotted qualified names to the project source files that define them.
//!
//! ## Resolution Order
//!
//! ```text
//! qualified name
//!     │
//!     ├──> cache (per resolver instance)
//!     ├──> export alias rewrite
//!     ├──> name-location service: `Require <name>.`
//!     │    └─> not a module? retry with the parent module
//!     ├──> load-path heuristic (longest logical prefix, subtree search)
//!     └──> external package filter
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use proofctx_resolver::{ModuleResolver, NameResolver, ResolverConfig};
//!
//! let config = ResolverConfig::new("/work/proj").with_mapping("theories", "MyLib");
//! let mut resolver = ModuleResolver::new(config).unwrap();
//! if let Some(path) = resolver.resolve("MyLib.Data.Tuple") {
//!     println!("defined in {}", path.display());
//! }
//! ```

mod config;
mod error;
mod heuristic;
mod paths;
mod project;
mod resolver;
mod session;

pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use paths::{file_key, normalize_lexically, relative_to};
pub use project::{LoadPath, LoadPathEntry};
pub use resolver::{normalize_name, ModuleResolver, NameResolver, ResolverStats};
pub use session::{LookupResponse, LookupSession, SessionFactory};
