use proofctx_graph::DepGraph;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Identity of a symbol across the project
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolKey {
    /// `./`-prefixed file key
    pub file: String,
    pub name: String,
}

impl SymbolKey {
    pub fn new(file: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
        }
    }
}

/// Dependency record of one symbol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    /// Same-file symbols this one depends on, transitively
    pub in_file: BTreeSet<String>,

    /// File key -> names used from that file
    pub cross_file: BTreeMap<String, BTreeSet<String>>,

    /// Source of the owning file preceding this symbol's proof
    pub context_snapshot: String,
}

impl Dependencies {
    pub fn add_cross_file(&mut self, file: &str, name: &str) {
        self.cross_file
            .entry(file.to_string())
            .or_default()
            .insert(name.to_string());
    }

    pub fn cross_file_edge_count(&self) -> usize {
        self.cross_file.values().map(BTreeSet::len).sum()
    }
}

/// A symbol defined in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    pub signature: String,
    pub body: Option<String>,

    /// Index of the defining statement among the file's definitions
    pub position: usize,
    pub dependencies: Dependencies,
}

/// Everything extracted from one file
#[derive(Debug, Clone, Default)]
pub struct FileTable {
    key: String,
    symbols: Vec<SymbolEntry>,
    positions: HashMap<String, usize>,
    pub(crate) exports: BTreeSet<String>,
    pub(crate) import_watches: BTreeSet<String>,
    pub(crate) notations: Vec<String>,
    pub(crate) instance_fields: BTreeMap<String, BTreeSet<String>>,
    pub(crate) pending: BTreeMap<String, BTreeSet<String>>,
    symbol_graph: DepGraph,
}

impl FileTable {
    pub(crate) fn new(key: &str, symbol_graph: DepGraph) -> Self {
        Self {
            key: key.to_string(),
            symbol_graph,
            ..Self::default()
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record a definition statement. A later record for the same name
    /// replaces the signature and keeps the original position.
    pub(crate) fn define(&mut self, name: &str, signature: &str, body: Option<&str>) {
        let index = match self.positions.get(name) {
            Some(&index) => index,
            None => {
                let index = self.symbols.len();
                self.symbols.push(SymbolEntry {
                    name: name.to_string(),
                    signature: String::new(),
                    body: None,
                    position: index,
                    dependencies: Dependencies::default(),
                });
                self.positions.insert(name.to_string(), index);
                index
            }
        };

        let entry = &mut self.symbols[index];
        entry.signature = signature.to_string();
        if let Some(body) = body {
            entry.body = Some(body.to_string());
        }
    }

    pub(crate) fn dependencies_mut(&mut self, name: &str) -> Option<&mut Dependencies> {
        let index = *self.positions.get(name)?;
        Some(&mut self.symbols[index].dependencies)
    }

    /// Merge the symbol graph closure into every in-file dependency set
    pub(crate) fn close_in_file_dependencies(&mut self) {
        for entry in &mut self.symbols {
            let closure = self.symbol_graph.transitive_successors(&entry.name);
            entry.dependencies.in_file.extend(closure);
        }
    }

    pub fn defines(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn symbol(&self, name: &str) -> Option<&SymbolEntry> {
        self.positions.get(name).map(|&index| &self.symbols[index])
    }

    /// Symbols in definition order
    pub fn symbols(&self) -> &[SymbolEntry] {
        &self.symbols
    }

    /// Files this file re-exports
    pub fn exports(&self) -> &BTreeSet<String> {
        &self.exports
    }

    /// Files whose top-level names are visible here
    pub fn import_watches(&self) -> &BTreeSet<String> {
        &self.import_watches
    }

    pub fn notations(&self) -> &[String] {
        &self.notations
    }

    /// Field name -> classes or instances declaring it
    pub fn instance_fields(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.instance_fields
    }

    pub fn symbol_graph(&self) -> &DepGraph {
        &self.symbol_graph
    }
}

/// Summary counts of an extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub files: usize,
    pub symbols: usize,
    pub bodies: usize,
    pub cross_file_edges: usize,
}

/// Result of an extraction run; read-only afterwards
#[derive(Debug, Clone, Default)]
pub struct DependencyIndex {
    pub(crate) file_graph: DepGraph,
    pub(crate) order: Vec<String>,
    pub(crate) files: HashMap<String, FileTable>,
}

impl DependencyIndex {
    /// File graph with normalized keys, dependency -> dependent
    pub fn file_graph(&self) -> &DepGraph {
        &self.file_graph
    }

    /// File keys in processing order, dependencies first
    pub fn processing_order(&self) -> &[String] {
        &self.order
    }

    pub fn file(&self, key: &str) -> Option<&FileTable> {
        self.files.get(key)
    }

    /// File tables in processing order
    pub fn files(&self) -> impl Iterator<Item = &FileTable> {
        self.order.iter().filter_map(|key| self.files.get(key))
    }

    pub fn symbol(&self, key: &SymbolKey) -> Option<&SymbolEntry> {
        self.files.get(&key.file)?.symbol(&key.name)
    }

    pub fn dependencies(&self, key: &SymbolKey) -> Option<&Dependencies> {
        self.symbol(key).map(|entry| &entry.dependencies)
    }

    /// Every symbol key, files in processing order, symbols in definition order
    pub fn symbol_keys(&self) -> Vec<SymbolKey> {
        self.files()
            .flat_map(|table| {
                table
                    .symbols()
                    .iter()
                    .map(|entry| SymbolKey::new(table.key(), &entry.name))
            })
            .collect()
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            files: self.files.len(),
            ..IndexStats::default()
        };
        for entry in self.files.values().flat_map(FileTable::symbols) {
            stats.symbols += 1;
            stats.bodies += usize::from(entry.body.is_some());
            stats.cross_file_edges += entry.dependencies.cross_file_edge_count();
        }
        stats
    }
}
