//! # Proof Context Assembler
//!
//! Turns a [`proofctx_extract::DependencyIndex`] into per-symbol context
//! objects: the symbol itself plus the ordered text of everything it
//! transitively depends on.
//!
//! ## Ordering
//!
//! ```text
//! symbol
//!   ├─> in-file dependency (symbol graph order)
//!   │     └─> its own dependencies, depth first
//!   └─> cross-file dependency (file order, then symbol graph order)
//!         └─> its own dependencies, depth first
//! ```
//!
//! Every symbol is expanded at most once per walk, so cyclic records
//! terminate in linear time. The first occurrence of each symbol wins and
//! the symbol never appears in its own list.
//!
//! ## Example
//!
//! ```rust,ignore
//! use proofctx_assembler::{AssemblyOptions, ContextAssembler};
//!
//! let assembler = ContextAssembler::with_options(&index, AssemblyOptions::for_prompt_context())?;
//! for object in assembler.assemble_all()? {
//!     println!("{}: {} dependencies", object.name, object.dependencies.len());
//! }
//! ```

mod assembler;
mod error;
mod options;
mod ranking;
mod render;

pub use assembler::{AssemblerStats, ContextAssembler};
pub use error::{AssembleError, Result};
pub use options::AssemblyOptions;
