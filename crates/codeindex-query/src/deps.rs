//! `dependencies` and `dependents`: IMPORTS neighbors of one file.

use serde::Serialize;

use codeindex_core::IndexError;
use codeindex_graph::EdgeKind;

use crate::{suggest_files, CodeIndex, Page};

#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub file: String,
    pub score: f64,
    pub symbol_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileListResult {
    pub files: Vec<FileEntry>,
    pub total: usize,
    pub file_not_found: bool,
    pub suggestions: Vec<String>,
}

/// Files this file imports (outgoing `IMPORTS`), ranked by file score.
pub fn dependencies(
    index: &mut CodeIndex,
    file: &str,
    page: Page,
) -> Result<FileListResult, IndexError> {
    import_neighbors(index, file, page, true)
}

/// Files importing this file (incoming `IMPORTS`), ranked by file score.
pub fn dependents(
    index: &mut CodeIndex,
    file: &str,
    page: Page,
) -> Result<FileListResult, IndexError> {
    import_neighbors(index, file, page, false)
}

fn import_neighbors(
    index: &mut CodeIndex,
    file: &str,
    page: Page,
    outgoing: bool,
) -> Result<FileListResult, IndexError> {
    index.ensure()?;

    if index.graph().file(file).is_none() {
        let suggestions = suggest_files(index.graph(), file);
        return Ok(FileListResult {
            files: Vec::new(),
            total: 0,
            file_not_found: true,
            suggestions,
        });
    }

    let neighbors = if outgoing {
        index.graph().out_neighbors(file, EdgeKind::Imports)
    } else {
        index.graph().in_neighbors(file, EdgeKind::Imports)
    };

    let scores = index.file_scores().clone();
    let graph = index.graph();
    let mut files: Vec<FileEntry> = neighbors
        .into_iter()
        .filter_map(|path| {
            let node = graph.file(&path)?;
            Some(FileEntry {
                score: scores.get(&path).copied().unwrap_or(0.0),
                symbol_count: node.symbol_count,
                file: path,
            })
        })
        .collect();
    files.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file.cmp(&b.file))
    });

    let total = files.len();
    let files = if page.count { Vec::new() } else { page.apply(files) };
    Ok(FileListResult {
        files,
        total,
        file_not_found: false,
        suggestions: Vec::new(),
    })
}
