//! `map`: the ranked repository overview.

use serde::Serialize;

use codeindex_core::IndexError;

use crate::search::hit_for;
use crate::{CodeIndex, Page, SymbolHit};

#[derive(Debug, Clone, Default)]
pub struct MapParams {
    pub focus_files: Vec<String>,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapSymbol {
    pub name: String,
    pub line_start: usize,
    pub signature: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapFile {
    pub file: String,
    pub symbols: Vec<MapSymbol>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapResult {
    pub files: Vec<MapFile>,
    pub shown_files: usize,
    pub shown_symbols: usize,
    pub total_files: usize,
    pub total_symbols: usize,
}

/// The repository's symbols in rank order, grouped by file (file groups
/// appear in order of their best-ranked symbol).
pub fn map(index: &mut CodeIndex, params: MapParams) -> Result<MapResult, IndexError> {
    index.ensure()?;

    let ranked: Vec<(String, f64)> = if params.focus_files.is_empty() {
        index.ranked().to_vec()
    } else {
        index.ranked_focused(&params.focus_files)
    };

    let graph = index.graph();
    let total_symbols = ranked.len();
    let total_files = graph.files().count();

    if params.page.count {
        return Ok(MapResult {
            files: Vec::new(),
            shown_files: 0,
            shown_symbols: 0,
            total_files,
            total_symbols,
        });
    }

    let shown: Vec<SymbolHit> = params
        .page
        .apply(ranked)
        .into_iter()
        .filter_map(|(key, score)| hit_for(graph, &key, score))
        .collect();
    let shown_symbols = shown.len();

    let mut files: Vec<MapFile> = Vec::new();
    for hit in shown {
        let entry = MapSymbol {
            name: hit.name,
            line_start: hit.line_start,
            signature: hit.signature,
            score: hit.score,
        };
        match files.iter().position(|f| f.file == hit.file) {
            Some(i) => files[i].symbols.push(entry),
            None => files.push(MapFile {
                file: hit.file,
                symbols: vec![entry],
            }),
        }
    }
    let shown_files = files.len();

    Ok(MapResult {
        files,
        shown_files,
        shown_symbols,
        total_files,
        total_symbols,
    })
}

/// Text shape: file headers with `"  {line:>4}│ {signature}"` rows.
pub fn render_map_text(result: &MapResult) -> String {
    let mut out = String::new();
    for group in &result.files {
        out.push_str(&group.file);
        out.push('\n');
        for symbol in &group.symbols {
            out.push_str(&format!("  {:>4}│ {}\n", symbol.line_start, symbol.signature));
        }
    }
    out.push_str(&format!(
        "{} symbols in {} files (of {} symbols in {} files)\n",
        result.shown_symbols, result.shown_files, result.total_symbols, result.total_files
    ));
    out
}
