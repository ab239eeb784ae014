//! `diff` and `history`: working tree versus a git ref, and per-symbol
//! line-range history.

use std::collections::HashMap;

use serde::Serialize;

use codeindex_core::{Definition, IndexError};
use codeindex_graph::EdgeKind;

use crate::git::Git;
use crate::{suggest_symbols, CodeIndex};

#[derive(Debug, Clone)]
pub struct DiffParams {
    pub reference: String,
}

impl Default for DiffParams {
    fn default() -> Self {
        Self {
            reference: "HEAD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffFileChange {
    pub file: String,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
    /// Highest external caller count among modified/removed definitions.
    pub callers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffResult {
    pub changed: Vec<DiffFileChange>,
    pub total_callers: usize,
    pub vcs_error: Option<String>,
}

/// Definitions added, removed, or signature-modified per changed file,
/// ranked by how many external files call into the changed definitions.
pub fn diff(index: &mut CodeIndex, params: DiffParams) -> Result<DiffResult, IndexError> {
    index.ensure()?;
    let git = Git::new(index.root());

    let mut paths = match git.changed_files(&params.reference) {
        Ok(paths) => paths,
        Err(err) => {
            return Ok(DiffResult {
                changed: Vec::new(),
                total_callers: 0,
                vcs_error: Some(err.to_string()),
            })
        }
    };
    match git.untracked_files() {
        Ok(untracked) => {
            for path in untracked {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        Err(err) => {
            tracing::warn!("ls-files failed: {err}");
        }
    }

    let mut changed: Vec<DiffFileChange> = Vec::new();
    for path in paths {
        let current = index
            .read_source(&path)
            .and_then(|source| codeindex_lang::extract(&path, &source))
            .map(|fs| fs.definitions)
            .unwrap_or_default();
        let committed = git
            .show(&params.reference, &path)
            .ok()
            .and_then(|source| codeindex_lang::extract(&path, &source))
            .map(|fs| fs.definitions)
            .unwrap_or_default();

        if current.is_empty() && committed.is_empty() {
            continue;
        }

        let entry = compare_definitions(index, &path, &current, &committed);
        if !entry.added.is_empty() || !entry.removed.is_empty() || !entry.modified.is_empty() {
            changed.push(entry);
        }
    }

    changed.sort_by(|a, b| b.callers.cmp(&a.callers).then_with(|| a.file.cmp(&b.file)));
    let total_callers = changed.iter().map(|c| c.callers).sum();

    Ok(DiffResult {
        changed,
        total_callers,
        vcs_error: None,
    })
}

fn compare_definitions(
    index: &CodeIndex,
    path: &str,
    current: &[Definition],
    committed: &[Definition],
) -> DiffFileChange {
    let current_by_name: HashMap<&str, &Definition> =
        current.iter().map(|d| (d.name.as_str(), d)).collect();
    let committed_by_name: HashMap<&str, &Definition> =
        committed.iter().map(|d| (d.name.as_str(), d)).collect();

    let mut added: Vec<String> = current_by_name
        .keys()
        .filter(|name| !committed_by_name.contains_key(**name))
        .map(|s| s.to_string())
        .collect();
    let mut removed: Vec<String> = committed_by_name
        .keys()
        .filter(|name| !current_by_name.contains_key(**name))
        .map(|s| s.to_string())
        .collect();
    let mut modified: Vec<String> = current_by_name
        .iter()
        .filter(|(name, def)| {
            committed_by_name
                .get(**name)
                .is_some_and(|old| old.signature != def.signature)
        })
        .map(|(name, _)| name.to_string())
        .collect();
    added.sort();
    removed.sort();
    modified.sort();

    // External impact: who calls the definitions that moved or vanished.
    let callers = modified
        .iter()
        .chain(removed.iter())
        .map(|name| external_caller_count(index, path, name))
        .max()
        .unwrap_or(0);

    DiffFileChange {
        file: path.to_string(),
        added,
        removed,
        modified,
        callers,
    }
}

fn external_caller_count(index: &CodeIndex, file: &str, name: &str) -> usize {
    let key = codeindex_core::symbol_key(file, name);
    index
        .graph()
        .in_neighbors(&key, EdgeKind::References)
        .iter()
        .filter(|source| source.as_str() != file)
        .count()
}

// ── history ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct HistoryParams {
    pub symbol: String,
    pub file: Option<String>,
    pub limit: usize,
    pub skip: usize,
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            file: None,
            limit: 10,
            skip: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResult {
    pub target: Option<String>,
    pub entries: Vec<HistoryEntry>,
    pub vcs_error: Option<String>,
    pub suggestions: Vec<String>,
}

/// `git log -L` over the resolved symbol's span.
pub fn history(index: &mut CodeIndex, params: HistoryParams) -> Result<HistoryResult, IndexError> {
    index.ensure()?;

    let target = index
        .graph()
        .symbols()
        .filter(|s| s.name == params.symbol)
        .filter(|s| params.file.as_deref().map_or(true, |f| s.file == f))
        .min_by(|a, b| a.key().cmp(&b.key()))
        .cloned();

    let Some(target) = target else {
        let suggestions = suggest_symbols(index.graph(), &params.symbol);
        return Ok(HistoryResult {
            target: None,
            entries: Vec::new(),
            vcs_error: None,
            suggestions,
        });
    };

    let git = Git::new(index.root());
    let raw = match git.log_range(
        &target.file,
        target.line_start,
        target.line_end,
        params.limit,
        params.skip,
    ) {
        Ok(raw) => raw,
        Err(err) => {
            return Ok(HistoryResult {
                target: Some(target.key()),
                entries: Vec::new(),
                vcs_error: Some(err.to_string()),
                suggestions: Vec::new(),
            })
        }
    };

    let entries = raw
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(4, '\t');
            Some(HistoryEntry {
                hash: parts.next()?.to_string(),
                author: parts.next()?.to_string(),
                date: parts.next()?.to_string(),
                subject: parts.next().unwrap_or("").to_string(),
            })
        })
        .collect();

    Ok(HistoryResult {
        target: Some(target.key()),
        entries,
        vcs_error: None,
        suggestions: Vec::new(),
    })
}
