//! Deterministic ordering of dependencies.

use proofctx_extract::DependencyIndex;
use std::cmp::Ordering;
use std::collections::HashMap;

/// File and symbol ranks, computed once per index
pub(crate) struct Ranking {
    files: HashMap<String, usize>,

    /// file -> symbol -> position in the symbol graph order, dependencies first
    graph_ranks: HashMap<String, HashMap<String, usize>>,
}

impl Ranking {
    pub(crate) fn new(index: &DependencyIndex) -> Self {
        let files = index
            .processing_order()
            .iter()
            .enumerate()
            .map(|(rank, file)| (file.clone(), rank))
            .collect();

        let graph_ranks = index
            .files()
            .map(|table| {
                let ranks = table
                    .symbol_graph()
                    .rank(true)
                    .unwrap_or_else(|| {
                        log::debug!(
                            "Symbol graph of {} is cyclic, ranking by position",
                            table.key()
                        );
                        Vec::new()
                    })
                    .into_iter()
                    .collect();
                (table.key().to_string(), ranks)
            })
            .collect();

        Self { files, graph_ranks }
    }

    pub(crate) fn file_rank(&self, file: &str) -> usize {
        self.files.get(file).copied().unwrap_or(usize::MAX)
    }

    /// Graph members first in graph order, then definitions by position,
    /// then anything else; names break remaining ties.
    pub(crate) fn compare_symbols(
        &self,
        index: &DependencyIndex,
        file: &str,
        a: &str,
        b: &str,
    ) -> Ordering {
        self.symbol_rank(index, file, a)
            .cmp(&self.symbol_rank(index, file, b))
            .then_with(|| a.cmp(b))
    }

    fn symbol_rank(&self, index: &DependencyIndex, file: &str, name: &str) -> (usize, usize) {
        let graph_rank = self
            .graph_ranks
            .get(file)
            .and_then(|ranks| ranks.get(name))
            .copied()
            .unwrap_or(usize::MAX);
        let position = index
            .file(file)
            .and_then(|table| table.symbol(name))
            .map_or(usize::MAX, |entry| entry.position);
        (graph_rank, position)
    }
}
