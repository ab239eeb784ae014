//! `orphans`: files nobody imports, symbols nobody references from outside.

use serde::Serialize;

use codeindex_core::{filters, IndexError};
use codeindex_graph::EdgeKind;

use crate::search::hit_for;
use crate::{CodeIndex, FileEntry, Page, SymbolHit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanLevel {
    File,
    Symbol,
}

impl std::str::FromStr for OrphanLevel {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "symbol" => Ok(Self::Symbol),
            other => Err(IndexError::Usage(format!(
                "unknown orphan level: {other} (expected file or symbol)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrphanParams {
    pub level: OrphanLevel,
    pub kind: Option<codeindex_core::SymbolKind>,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrphansResult {
    pub files: Vec<FileEntry>,
    pub symbols: Vec<SymbolHit>,
    pub total: usize,
}

pub fn orphans(index: &mut CodeIndex, params: OrphanParams) -> Result<OrphansResult, IndexError> {
    index.ensure()?;

    match params.level {
        OrphanLevel::File => file_orphans(index, params.page),
        OrphanLevel::Symbol => symbol_orphans(index, params.kind, params.page),
    }
}

/// Files with no incident `IMPORTS` edge at all, minus the false-positive
/// table, ordered by descending symbol count.
fn file_orphans(index: &mut CodeIndex, page: Page) -> Result<OrphansResult, IndexError> {
    let graph = index.graph();
    let mut files: Vec<FileEntry> = graph
        .files()
        .filter(|f| {
            graph.out_neighbors(&f.path, EdgeKind::Imports).is_empty()
                && graph.in_neighbors(&f.path, EdgeKind::Imports).is_empty()
        })
        .filter(|f| !filters::is_orphan_file_false_positive(&f.path))
        .map(|f| FileEntry {
            file: f.path.clone(),
            score: 0.0,
            symbol_count: f.symbol_count,
        })
        .collect();
    files.sort_by(|a, b| {
        b.symbol_count
            .cmp(&a.symbol_count)
            .then_with(|| a.file.cmp(&b.file))
    });

    let total = files.len();
    let files = if page.count { Vec::new() } else { page.apply(files) };
    Ok(OrphansResult {
        files,
        symbols: Vec::new(),
        total,
    })
}

/// Symbols whose incoming `REFERENCES` all come from their own file, minus
/// the false-positive table, ordered by `(file, line_start)`.
fn symbol_orphans(
    index: &mut CodeIndex,
    kind: Option<codeindex_core::SymbolKind>,
    page: Page,
) -> Result<OrphansResult, IndexError> {
    let graph = index.graph();
    let mut symbols: Vec<SymbolHit> = graph
        .symbols()
        .filter(|s| {
            if let Some(kind) = kind {
                if s.kind != kind {
                    return false;
                }
            }
            graph
                .in_neighbors(&s.key(), EdgeKind::References)
                .iter()
                .all(|source| *source == s.file)
        })
        .filter(|s| !filters::is_orphan_symbol_false_positive(&s.name, &s.file, &s.signature))
        .filter_map(|s| hit_for(graph, &s.key(), 0.0))
        .collect();
    symbols.sort_by(|a, b| a.file.cmp(&b.file).then_with(|| a.line_start.cmp(&b.line_start)));

    let total = symbols.len();
    let symbols = if page.count { Vec::new() } else { page.apply(symbols) };
    Ok(OrphansResult {
        files: Vec::new(),
        symbols,
        total,
    })
}
