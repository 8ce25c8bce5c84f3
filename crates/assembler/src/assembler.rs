use crate::error::{AssembleError, Result};
use crate::options::AssemblyOptions;
use crate::ranking::Ranking;
use crate::render::render;
use proofctx_extract::{DependencyIndex, SymbolKey};
use proofctx_protocol::{ContextObject, PROTOCOL_SCHEMA_VERSION};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Minimal context assembler for proof objects
///
/// Walks the dependency records of a finished [`DependencyIndex`] and
/// renders, for each symbol, the ordered list of everything it needs.
/// Closures are memoized, so one assembler should serve a whole run; it can
/// be shared across threads.
pub struct ContextAssembler<'a> {
    index: &'a DependencyIndex,
    options: AssemblyOptions,
    ranking: Ranking,
    memo: RwLock<HashMap<SymbolKey, Arc<Vec<SymbolKey>>>>,
}

/// State of one depth-first walk: visit index of every node, in visit order
#[derive(Default)]
struct Walk {
    visited: HashMap<SymbolKey, usize>,
    order: Vec<SymbolKey>,
}

impl Walk {
    fn enter(&mut self, key: &SymbolKey) -> usize {
        let index = self.order.len();
        self.visited.insert(key.clone(), index);
        self.order.push(key.clone());
        index
    }
}

/// Statistics about an assembler's work so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerStats {
    pub symbols: usize,
    pub memoized: usize,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(index: &'a DependencyIndex) -> Self {
        Self {
            index,
            options: AssemblyOptions::default(),
            ranking: Ranking::new(index),
            memo: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_options(index: &'a DependencyIndex, options: AssemblyOptions) -> Result<Self> {
        options.validate().map_err(AssembleError::Options)?;
        Ok(Self {
            options,
            ..Self::new(index)
        })
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Ordered, de-duplicated transitive dependencies of `key`, excluding
    /// `key` itself
    ///
    /// Dependencies are listed in depth-first pre-order; each symbol is
    /// expanded once, so cycles cost no more than acyclic graphs.
    pub fn closure(&self, key: &SymbolKey) -> Vec<SymbolKey> {
        let mut walk = Walk::default();
        if let Some(cached) = self.cached(key, &walk) {
            return cached.as_ref().clone();
        }
        self.visit(key, &mut walk);
        walk.order.split_off(1)
    }

    /// Context object for one symbol
    pub fn assemble(&self, key: &SymbolKey) -> Result<ContextObject> {
        let entry = self
            .index
            .symbol(key)
            .ok_or_else(|| AssembleError::UnknownSymbol {
                file: key.file.clone(),
                name: key.name.clone(),
            })?;

        let ordered = self.closure(key);

        let mut notations: BTreeSet<String> = BTreeSet::new();
        let mut notation_files: Vec<&str> = vec![key.file.as_str()];
        notation_files.extend(ordered.iter().map(|dep| dep.file.as_str()));
        let mut seen_files = HashSet::new();
        for file in notation_files {
            if !seen_files.insert(file) {
                continue;
            }
            if let Some(table) = self.index.file(file) {
                notations.extend(table.notations().iter().cloned());
            }
        }

        let mut seen = HashSet::new();
        let mut dependencies = Vec::new();
        for dep in &ordered {
            let normalized = SymbolKey::new(dep.file.as_str(), self.options.normalize(&dep.name));
            if normalized == *key || !seen.insert(normalized.clone()) {
                continue;
            }
            if !self.options.include_same_file && normalized.file == key.file {
                continue;
            }
            if let Some(text) = render(self.index, &normalized, self.options.include_bodies) {
                dependencies.push(text);
            }
        }

        Ok(ContextObject {
            schema_version: PROTOCOL_SCHEMA_VERSION,
            name: key.name.clone(),
            file: key.file.clone(),
            signature: entry.signature.clone(),
            body: entry.body.clone().unwrap_or_default(),
            context_snapshot: entry.dependencies.context_snapshot.clone(),
            dependencies,
            notations,
        })
    }

    /// Context objects for several symbols
    pub fn assemble_batch(&self, keys: &[SymbolKey]) -> Vec<Result<ContextObject>> {
        keys.iter().map(|key| self.assemble(key)).collect()
    }

    /// Context objects for every symbol, files in processing order
    pub fn assemble_all(&self) -> Result<Vec<ContextObject>> {
        let objects = self
            .index
            .symbol_keys()
            .iter()
            .map(|key| self.assemble(key))
            .collect::<Result<Vec<_>>>()?;

        let stats = self.stats();
        log::info!(
            "Assembled {} context objects ({} closures memoized)",
            objects.len(),
            stats.memoized
        );
        Ok(objects)
    }

    pub fn stats(&self) -> AssemblerStats {
        AssemblerStats {
            symbols: self.index.stats().symbols,
            memoized: self.memo.read().map(|memo| memo.len()).unwrap_or(0),
        }
    }

    /// Depth-first pre-order visit of `key`, which must not be visited yet.
    ///
    /// Returns the smallest visit index among the already visited nodes the
    /// subtree ran into, or `usize::MAX` when it ran into none.
    fn visit(&self, key: &SymbolKey, walk: &mut Walk) -> usize {
        let start = walk.enter(key);
        let mut low = usize::MAX;

        for dep in self.ordered_dependencies(key) {
            if let Some(&index) = walk.visited.get(&dep) {
                low = low.min(index);
                continue;
            }
            if let Some(cached) = self.cached(&dep, walk) {
                walk.enter(&dep);
                for nested in cached.iter() {
                    walk.enter(nested);
                }
                continue;
            }
            low = low.min(self.visit(&dep, walk));
        }

        // A subtree that only met its own nodes is what a fresh walk yields.
        if low >= start {
            let closure = Arc::new(walk.order[start + 1..].to_vec());
            if let Ok(mut memo) = self.memo.write() {
                memo.insert(key.clone(), closure);
            }
        }
        low
    }

    /// Memoized closure of `key`, unless the walk already visited one of
    /// its members
    fn cached(&self, key: &SymbolKey, walk: &Walk) -> Option<Arc<Vec<SymbolKey>>> {
        let memo = self.memo.read().ok()?;
        let cached = memo.get(key)?;
        if cached.iter().any(|dep| walk.visited.contains_key(dep)) {
            return None;
        }
        Some(Arc::clone(cached))
    }

    /// Direct dependencies of `key`: in-file first, then cross-file by file rank
    fn ordered_dependencies(&self, key: &SymbolKey) -> Vec<SymbolKey> {
        let Some(dependencies) = self.index.dependencies(key) else {
            return Vec::new();
        };
        let compare = |file: &str, a: &str, b: &str| {
            self.ranking.compare_symbols(self.index, file, a, b)
        };

        let mut in_file: Vec<&str> = dependencies.in_file.iter().map(String::as_str).collect();
        in_file.sort_by(|a, b| compare(key.file.as_str(), *a, *b));

        let mut files: Vec<&String> = dependencies.cross_file.keys().collect();
        files.sort_by(|a, b| {
            self.ranking
                .file_rank(a)
                .cmp(&self.ranking.file_rank(b))
                .then_with(|| a.cmp(b))
        });

        let mut ordered: Vec<SymbolKey> = in_file
            .into_iter()
            .map(|name| SymbolKey::new(key.file.as_str(), name))
            .collect();
        for file in files {
            let mut names: Vec<&str> = dependencies.cross_file[file]
                .iter()
                .map(String::as_str)
                .collect();
            names.sort_by(|a, b| compare(file.as_str(), *a, *b));
            ordered.extend(names.into_iter().map(|name| SymbolKey::new(file.as_str(), name)));
        }
        ordered
    }
}
