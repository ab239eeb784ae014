//! `search` and `symbols`: ranked symbol listings with filters.

use serde::Serialize;

use codeindex_core::{IndexError, SymbolKind};
use codeindex_graph::CodeGraph;

use crate::{suggest_files, CodeIndex, Page};

/// One ranked symbol, as returned by most operators.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolHit {
    pub key: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub line_start: usize,
    pub line_end: usize,
    pub signature: String,
    pub score: f64,
}

pub(crate) fn hit_for(graph: &CodeGraph, key: &str, score: f64) -> Option<SymbolHit> {
    let symbol = graph.symbol(key)?;
    Some(SymbolHit {
        key: key.to_string(),
        name: symbol.name.clone(),
        kind: symbol.kind,
        file: symbol.file.clone(),
        line_start: symbol.line_start,
        line_end: symbol.line_end,
        signature: symbol.signature.clone(),
        score,
    })
}

#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    pub kind: Option<SymbolKind>,
    pub page: Page,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolsParams {
    pub file: Option<String>,
    pub kind: Option<SymbolKind>,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolsResult {
    pub symbols: Vec<SymbolHit>,
    pub total: usize,
    pub file_not_found: bool,
    pub suggestions: Vec<String>,
}

/// Case-insensitive substring search over symbol names and signatures,
/// ranked by unfocused PageRank.
pub fn search(index: &mut CodeIndex, params: SearchParams) -> Result<SymbolsResult, IndexError> {
    index.ensure()?;
    let needle = params.query.to_lowercase();

    let ranked = index.ranked().to_vec();
    let graph = index.graph();
    let hits: Vec<SymbolHit> = ranked
        .iter()
        .filter_map(|(key, score)| {
            let symbol = graph.symbol(key)?;
            if let Some(kind) = params.kind {
                if symbol.kind != kind {
                    return None;
                }
            }
            let matched = symbol.name.to_lowercase().contains(&needle)
                || symbol.signature.to_lowercase().contains(&needle);
            if matched {
                hit_for(graph, key, *score)
            } else {
                None
            }
        })
        .collect();

    let total = hits.len();
    let symbols = if params.page.count {
        Vec::new()
    } else {
        params.page.apply(hits)
    };
    Ok(SymbolsResult {
        symbols,
        total,
        file_not_found: false,
        suggestions: Vec::new(),
    })
}

/// Enumerate symbol nodes, optionally narrowed to one file and one kind.
pub fn symbols(index: &mut CodeIndex, params: SymbolsParams) -> Result<SymbolsResult, IndexError> {
    index.ensure()?;

    if let Some(file) = &params.file {
        if index.graph().file(file).is_none() {
            let suggestions = suggest_files(index.graph(), file);
            return Ok(SymbolsResult {
                symbols: Vec::new(),
                total: 0,
                file_not_found: true,
                suggestions,
            });
        }
    }

    let ranked = index.ranked().to_vec();
    let graph = index.graph();
    let hits: Vec<SymbolHit> = ranked
        .iter()
        .filter_map(|(key, score)| {
            let symbol = graph.symbol(key)?;
            if let Some(file) = &params.file {
                if &symbol.file != file {
                    return None;
                }
            }
            if let Some(kind) = params.kind {
                if symbol.kind != kind {
                    return None;
                }
            }
            hit_for(graph, key, *score)
        })
        .collect();

    let total = hits.len();
    let symbols = if params.page.count {
        Vec::new()
    } else {
        params.page.apply(hits)
    };
    Ok(SymbolsResult {
        symbols,
        total,
        file_not_found: false,
        suggestions: Vec::new(),
    })
}
