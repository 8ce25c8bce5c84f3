use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result};
use crate::imports::{parse_import, ImportStatement};
use crate::index::{DependencyIndex, FileTable};
use crate::source::SourceProvider;
use once_cell::sync::Lazy;
use proofctx_graph::DepGraph;
use proofctx_protocol::StatementRecord;
use proofctx_resolver::{file_key, NameResolver};
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

/// Field declarations inside a class or instance body (`ident :`)
static CLASS_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*([A-Za-z_]\w*)[ \t]*:").expect("valid field regex"));

/// Builds per-symbol dependency records for a whole project.
///
/// Files are processed one at a time in dependency order; the resolver and
/// its cache are shared by every file of the run.
pub struct DependencyExtractor<R> {
    resolver: R,
    config: ExtractConfig,
}

/// Mutable state while scanning one file
#[derive(Default)]
struct FileScan {
    /// Reconstructed source seen so far
    buffer: String,

    /// Short module name -> full module name, from `Require`
    require_aliases: HashMap<String, String>,

    /// Symbols whose signature is already in the buffer
    emitted: HashSet<String>,
}

impl<R: NameResolver> DependencyExtractor<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            config: ExtractConfig::default(),
        }
    }

    pub fn with_config(resolver: R, config: ExtractConfig) -> Result<Self> {
        config.validate().map_err(ExtractError::Config)?;
        Ok(Self { resolver, config })
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn into_resolver(self) -> R {
        self.resolver
    }

    /// Extract dependencies for every file of `file_graph`.
    ///
    /// `file_graph` edges point from a dependency to its dependent and must
    /// not form a cycle.
    pub fn run<S>(&mut self, file_graph: &DepGraph, sources: &mut S) -> Result<DependencyIndex>
    where
        S: SourceProvider + ?Sized,
    {
        let file_graph = normalize_file_graph(file_graph);
        let order = file_graph.topological_order(false)?;

        // Phase 1: scan files, dependencies first
        let mut files = HashMap::with_capacity(order.len());
        for key in &order {
            let table = self.scan_file(key, sources)?;
            files.insert(key.clone(), table);
        }

        let mut index = DependencyIndex {
            file_graph,
            order,
            files,
        };

        // Phase 2: make re-exported files visible to importers
        propagate_exports(&mut index);

        // Phase 3: match unqualified references against visible files
        resolve_unqualified(&mut index);

        let stats = index.stats();
        log::info!(
            "Extracted {} symbols ({} with proofs) from {} files, {} cross-file edges",
            stats.symbols,
            stats.bodies,
            stats.files,
            stats.cross_file_edges
        );
        Ok(index)
    }

    fn scan_file<S>(&mut self, key: &str, sources: &mut S) -> Result<FileTable>
    where
        S: SourceProvider + ?Sized,
    {
        log::debug!("Processing file: {key}");
        let records = sources.statements(key)?;
        let mut table = FileTable::new(key, sources.symbol_graph(key)?);
        let mut scan = FileScan::default();

        for record in &records {
            self.scan_statement(key, record, &mut table, &mut scan)?;
        }

        table.close_in_file_dependencies();

        let bodies = table.symbols().iter().filter(|s| s.body.is_some()).count();
        log::info!(
            "{key}: {} top-level signatures, {bodies} proof bodies",
            table.symbols().len()
        );
        Ok(table)
    }

    fn scan_statement(
        &mut self,
        key: &str,
        record: &StatementRecord,
        table: &mut FileTable,
        scan: &mut FileScan,
    ) -> Result<()> {
        let symbol = record.symbol_name();
        let body = record.body_text();

        if let Some(notation) = record.notation_text() {
            table.notations.push(notation.to_string());
        }

        match symbol {
            Some(name) => {
                if self.config.is_class_declaration(&record.text) {
                    for field in CLASS_FIELD_RE.captures_iter(&record.text) {
                        table
                            .instance_fields
                            .entry(field[1].to_string())
                            .or_default()
                            .insert(name.to_string());
                    }
                }
                table.define(name, &record.text, body);
            }
            None if record.notation_text().is_none() => {
                if let Some(import) = parse_import(key, &record.text)? {
                    self.apply_import(key, &record.text, &import, table, scan);
                }
            }
            None => {}
        }

        for reference in &record.references {
            let Some(name) = symbol else {
                continue;
            };
            if !reference.contains('.') {
                table
                    .pending
                    .entry(name.to_string())
                    .or_default()
                    .insert(reference.clone());
                continue;
            }
            if let Some((file, target)) = self.resolve_qualified(key, reference, scan) {
                if let Some(dependencies) = table.dependencies_mut(name) {
                    dependencies.add_cross_file(&file, target);
                }
            }
        }

        if let (Some(name), Some(_)) = (symbol, body) {
            if let Some(dependencies) = table.dependencies_mut(name) {
                dependencies.context_snapshot = scan.buffer.clone();
            }
        }

        scan.buffer.push_str(&reconstruct(record, &scan.emitted));
        scan.buffer.push('\n');
        if let Some(name) = symbol {
            scan.emitted.insert(name.to_string());
        }
        Ok(())
    }

    fn apply_import(
        &mut self,
        key: &str,
        text: &str,
        import: &ImportStatement,
        table: &mut FileTable,
        scan: &mut FileScan,
    ) {
        match import {
            ImportStatement::Unsupported => {
                log::warn!("{key}: unsupported import form, skipping: {}", text.trim());
            }
            ImportStatement::Require(modules) => {
                for module in modules {
                    self.register_require_alias(module, scan);
                }
            }
            ImportStatement::Import(modules) => {
                for module in modules {
                    self.register_require_alias(module, scan);
                    if let Some(file) = self.resolve_file(module) {
                        table.import_watches.insert(file);
                    }
                }
            }
            ImportStatement::Export(modules) => {
                for module in modules {
                    if let Some(file) = self.resolve_file(module) {
                        table.import_watches.insert(file.clone());
                        table.exports.insert(file);
                    }
                    if let Some(short) = last_segment(module) {
                        self.resolver.register_export_alias(short, module);
                    }
                }
            }
        }
    }

    fn register_require_alias(&self, module: &str, scan: &mut FileScan) {
        if !module.contains('.') || self.config.is_stdlib(module) {
            return;
        }
        if let Some(short) = last_segment(module) {
            scan.require_aliases
                .insert(short.to_string(), module.to_string());
        }
    }

    fn resolve_file(&mut self, name: &str) -> Option<String> {
        self.resolver
            .resolve(name)
            .map(|path| file_key(&path))
    }

    /// Resolve a dotted reference to `(file key, identifier)`; references
    /// into the current file are dropped.
    fn resolve_qualified<'r>(
        &mut self,
        key: &str,
        reference: &'r str,
        scan: &FileScan,
    ) -> Option<(String, &'r str)> {
        let (head, _) = reference.split_once('.')?;
        let target = last_segment(reference)?;
        let rewritten = match scan.require_aliases.get(head) {
            Some(full) => format!("{full}{}", &reference[head.len()..]),
            None => reference.to_string(),
        };

        let file = self.resolve_file(&rewritten)?;
        (file != key).then_some((file, target))
    }
}

/// Text a statement contributes to the running source buffer
fn reconstruct(record: &StatementRecord, emitted: &HashSet<String>) -> String {
    if let Some(notation) = record.notation_text() {
        return notation.to_string();
    }
    match (record.symbol_name(), record.body_text()) {
        (Some(name), Some(body)) if emitted.contains(name) => body.to_string(),
        (Some(_), Some(body)) => format!("{}\n{body}", record.text),
        _ => record.text.clone(),
    }
}

fn last_segment(name: &str) -> Option<&str> {
    name.trim_end_matches('.')
        .rsplit('.')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// Copy of `graph` with every node rendered as a file key
fn normalize_file_graph(graph: &DepGraph) -> DepGraph {
    let key = |name: &str| file_key(Path::new(name));
    let mut normalized = DepGraph::new();
    for node in graph.nodes() {
        normalized.add_node(&key(node));
    }
    for node in graph.nodes() {
        for successor in graph.successors(node) {
            normalized.add_edge(&key(node), &key(successor));
        }
    }
    normalized
}

/// Union the exports of every transitive file dependency into the
/// importer's watch set
fn propagate_exports(index: &mut DependencyIndex) {
    let mut closed: HashMap<String, BTreeSet<String>> = HashMap::new();
    for key in &index.order {
        closed.insert(key.clone(), closed_exports(index, key));
    }

    for key in &index.order {
        let mut visible = BTreeSet::new();
        for dependency in index.file_graph.transitive_predecessors(key) {
            if let Some(exports) = closed.get(&dependency) {
                visible.extend(exports.iter().cloned());
            }
        }
        if let Some(table) = index.files.get_mut(key) {
            table.import_watches.extend(visible);
        }
    }
}

/// Files exported by `key`, following `Require Export` chains
fn closed_exports(index: &DependencyIndex, key: &str) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    let mut stack: Vec<&str> = vec![key];
    while let Some(current) = stack.pop() {
        let Some(table) = index.files.get(current) else {
            continue;
        };
        for exported in &table.exports {
            if exported != key && result.insert(exported.clone()) {
                stack.push(exported);
            }
        }
    }
    result
}

/// Turn pending unqualified references into cross-file edges
fn resolve_unqualified(index: &mut DependencyIndex) {
    for key in index.order.clone() {
        let Some(table) = index.files.get(&key) else {
            continue;
        };

        let mut edges: Vec<(String, String, String)> = Vec::new();
        for (symbol, names) in &table.pending {
            for watched in table.import_watches.iter().filter(|w| **w != key) {
                let Some(watched_table) = index.files.get(watched) else {
                    continue;
                };
                for name in names {
                    if watched_table.defines(name) {
                        edges.push((symbol.clone(), watched.clone(), name.clone()));
                    }
                    if let Some(owners) = watched_table.instance_fields.get(name) {
                        for owner in owners {
                            edges.push((symbol.clone(), watched.clone(), owner.clone()));
                        }
                    }
                }
            }
        }

        if let Some(table) = index.files.get_mut(&key) {
            for (symbol, file, name) in edges {
                if let Some(dependencies) = table.dependencies_mut(&symbol) {
                    dependencies.add_cross_file(&file, &name);
                }
            }
        }
    }
}
