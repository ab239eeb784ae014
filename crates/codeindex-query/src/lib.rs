//! codeindex-query: the user-visible query operators.
//!
//! One `CodeIndex` session wraps the incremental cache and the ranking
//! caches. Every operator runs the same preamble: `ensure()` the cache,
//! invalidate rankings iff files moved, then answer from the graph.

mod callers;
mod context;
mod deps;
mod diff;
mod git;
mod map;
mod neighborhood;
mod orphans;
mod outline;
mod rank;
mod search;
mod trace;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use codeindex_core::IndexError;
use codeindex_graph::CodeGraph;
use codeindex_index::{IndexCache, ScanReport};

pub use callers::{callers, CallSite, CallerEntry, CallersParams, CallersResult};
pub use context::{context, ContextParams, ContextResult, TypePreview, UsedSymbol};
pub use deps::{dependencies, dependents, FileEntry, FileListResult};
pub use diff::{diff, history, DiffFileChange, DiffParams, DiffResult, HistoryEntry, HistoryParams, HistoryResult};
pub use git::Git;
pub use map::{map, render_map_text, MapFile, MapParams, MapResult, MapSymbol};
pub use neighborhood::{neighborhood, NeighborFile, NeighborhoodCounts, NeighborhoodParams, NeighborhoodResult};
pub use orphans::{orphans, OrphanLevel, OrphanParams, OrphansResult};
pub use outline::{outline, OutlineParams, OutlineResult};
pub use search::{search, symbols, SearchParams, SymbolHit, SymbolsParams, SymbolsResult};
pub use trace::{trace, TraceNode, TraceParams, TraceResult};

/// Pagination and count-mode controls shared by list operators. Applied
/// after ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
    pub offset: usize,
    pub limit: Option<usize>,
    pub count: bool,
}

impl Page {
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

/// One indexing session over a project root.
pub struct CodeIndex {
    cache: IndexCache,
    ranked: Option<Vec<(String, f64)>>,
    file_scores: Option<HashMap<String, f64>>,
}

impl CodeIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_cache(IndexCache::new(root))
    }

    /// Explicit cache file location (tests).
    pub fn with_cache_file(root: impl Into<PathBuf>, cache_file: PathBuf) -> Self {
        Self::from_cache(IndexCache::with_cache_file(root, cache_file))
    }

    fn from_cache(cache: IndexCache) -> Self {
        Self {
            cache,
            ranked: None,
            file_scores: None,
        }
    }

    pub fn root(&self) -> &Path {
        self.cache.root()
    }

    /// The shared operator preamble: sync with disk, drop stale rankings.
    pub(crate) fn ensure(&mut self) -> Result<ScanReport, IndexError> {
        let report = self.cache.ensure()?;
        if report.dirty() {
            self.ranked = None;
            self.file_scores = None;
        }
        Ok(report)
    }

    pub(crate) fn graph(&self) -> &CodeGraph {
        self.cache.graph()
    }

    /// Session-cached unfocused symbol ranking, best first.
    pub(crate) fn ranked(&mut self) -> &[(String, f64)] {
        if self.ranked.is_none() {
            self.ranked = Some(rank::rank_symbols(
                self.cache.graph(),
                &[],
                self.cache.path_tiers(),
            ));
        }
        self.ranked.as_deref().unwrap_or(&[])
    }

    /// Session-cached unfocused file scores (sum of symbol scores).
    pub(crate) fn file_scores(&mut self) -> &HashMap<String, f64> {
        if self.file_scores.is_none() {
            let ranked = self.ranked().to_vec();
            self.file_scores = Some(rank::file_scores(self.cache.graph(), &ranked));
        }
        self.file_scores.as_ref().unwrap()
    }

    /// Focus-biased ranking; never cached (focus sets vary per query).
    pub(crate) fn ranked_focused(&self, focus_files: &[String]) -> Vec<(String, f64)> {
        rank::rank_symbols(self.cache.graph(), focus_files, self.cache.path_tiers())
    }

    pub(crate) fn read_source(&self, rel: &str) -> Option<String> {
        std::fs::read_to_string(self.cache.root().join(rel)).ok()
    }

    /// Drop all state and rebuild from disk.
    pub fn reindex(&mut self) -> Result<ScanReport, IndexError> {
        self.ranked = None;
        self.file_scores = None;
        self.cache.reindex()
    }

    /// Index statistics for the `stats` surface.
    pub fn stats(&mut self) -> Result<IndexStats, IndexError> {
        let report = self.ensure()?;
        let graph = self.graph();
        Ok(IndexStats {
            files: graph.files().count(),
            symbols: graph.symbols().count(),
            edges: graph.edge_count(),
            scanned: report.scanned,
            cache_path: self.cache.cache_path().display().to_string(),
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct IndexStats {
    pub files: usize,
    pub symbols: usize,
    pub edges: usize,
    pub scanned: usize,
    pub cache_path: String,
}

/// Up to 5 file suggestions for an unknown path: case-insensitive basename
/// matches first, then path-substring matches, in stable path order.
pub(crate) fn suggest_files(graph: &CodeGraph, query: &str) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let query_base = query_lower.rsplit('/').next().unwrap_or(&query_lower).to_string();

    let mut paths: Vec<&str> = graph.files().map(|f| f.path.as_str()).collect();
    paths.sort_unstable();

    let mut out: Vec<String> = Vec::new();
    for path in &paths {
        let base = path.rsplit('/').next().unwrap_or(path).to_lowercase();
        if base.contains(&query_base) {
            out.push(path.to_string());
            if out.len() == 5 {
                return out;
            }
        }
    }
    for path in &paths {
        if path.to_lowercase().contains(&query_lower) && !out.contains(&path.to_string()) {
            out.push(path.to_string());
            if out.len() == 5 {
                break;
            }
        }
    }
    out
}

/// Up to 5 symbol-name suggestions for an unknown name.
pub(crate) fn suggest_symbols(graph: &CodeGraph, query: &str) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let mut names: Vec<&str> = graph.symbols().map(|s| s.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();

    let mut out: Vec<String> = Vec::new();
    for name in names {
        if name.to_lowercase().contains(&query_lower) {
            out.push(name.to_string());
            if out.len() == 5 {
                break;
            }
        }
    }
    out
}
