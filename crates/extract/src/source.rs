//! Per-file inputs produced by the external scanning tools.

use crate::error::{ExtractError, Result};
use proofctx_graph::{parse_symbol_graph, DepGraph};
use proofctx_protocol::{parse_statements, StatementRecord};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies the statement stream and symbol graph of each file.
///
/// Files are addressed by their `./`-prefixed key.
pub trait SourceProvider {
    /// Statements of `file` in source order
    fn statements(&mut self, file: &str) -> Result<Vec<StatementRecord>>;

    /// Same-file symbol dependencies of `file`; empty when unknown
    fn symbol_graph(&mut self, _file: &str) -> Result<DepGraph> {
        Ok(DepGraph::new())
    }
}

/// Statement streams and symbol graphs held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySources {
    statements: HashMap<String, Vec<StatementRecord>>,
    graphs: HashMap<String, DepGraph>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>, records: Vec<StatementRecord>) -> Self {
        self.statements.insert(file.into(), records);
        self
    }

    #[must_use]
    pub fn with_symbol_graph(mut self, file: impl Into<String>, graph: DepGraph) -> Self {
        self.graphs.insert(file.into(), graph);
        self
    }
}

impl SourceProvider for InMemorySources {
    fn statements(&mut self, file: &str) -> Result<Vec<StatementRecord>> {
        Ok(self.statements.get(file).cloned().unwrap_or_default())
    }

    fn symbol_graph(&mut self, file: &str) -> Result<DepGraph> {
        Ok(self.graphs.get(file).cloned().unwrap_or_default())
    }
}

/// Reads tool output stored next to each source file.
///
/// For `./Data/Tuple.v` the statements come from `Data/Tuple.v.json` and the
/// symbol graph from `Data/Tuple.v.dot`, both under `root`. A missing
/// statement file is an error; a missing graph is an empty graph.
#[derive(Debug, Clone)]
pub struct ArtifactSources {
    root: PathBuf,
}

impl ArtifactSources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn artifact(&self, file: &str, extension: &str) -> PathBuf {
        let relative = file.strip_prefix("./").unwrap_or(file);
        self.root.join(format!("{relative}.{extension}"))
    }
}

fn read(file: &str, path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|err| ExtractError::source_failure(file, format!("{}: {err}", path.display())))
}

impl SourceProvider for ArtifactSources {
    fn statements(&mut self, file: &str) -> Result<Vec<StatementRecord>> {
        let text = read(file, &self.artifact(file, "json"))?;
        parse_statements(&text).map_err(|err| ExtractError::source_failure(file, err))
    }

    fn symbol_graph(&mut self, file: &str) -> Result<DepGraph> {
        let path = self.artifact(file, "dot");
        if !path.is_file() {
            return Ok(DepGraph::new());
        }
        let text = read(file, &path)?;
        if text.trim().is_empty() {
            return Ok(DepGraph::new());
        }
        parse_symbol_graph(&text).map_err(|err| ExtractError::source_failure(file, err))
    }
}
