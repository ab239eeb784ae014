//! `callers`: who references a symbol, with optional call-site excerpts.

use regex::Regex;
use serde::Serialize;

use codeindex_core::IndexError;
use codeindex_graph::{EdgeKind, SymbolNode};

use crate::{suggest_symbols, CodeIndex, Page};

#[derive(Debug, Clone, Default)]
pub struct CallersParams {
    pub symbol: String,
    pub file: Option<String>,
    /// Lines of surrounding context per call site; 0 disables excerpting.
    pub context: usize,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallSite {
    pub line: usize,
    pub excerpt: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallerEntry {
    pub file: String,
    pub score: f64,
    pub sites: Vec<CallSite>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallersResult {
    pub callers: Vec<CallerEntry>,
    pub total: usize,
    /// Symbol keys the name resolved to.
    pub targets: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn callers(index: &mut CodeIndex, params: CallersParams) -> Result<CallersResult, IndexError> {
    index.ensure()?;

    let targets: Vec<SymbolNode> = index
        .graph()
        .symbols()
        .filter(|s| s.name == params.symbol)
        .filter(|s| params.file.as_deref().map_or(true, |f| s.file == f))
        .cloned()
        .collect();

    if targets.is_empty() {
        let suggestions = suggest_symbols(index.graph(), &params.symbol);
        return Ok(CallersResult {
            callers: Vec::new(),
            total: 0,
            targets: Vec::new(),
            suggestions,
        });
    }

    // Unique caller files across every matching target.
    let mut caller_files: Vec<String> = Vec::new();
    for target in &targets {
        for source in index.graph().in_neighbors(&target.key(), EdgeKind::References) {
            if !caller_files.contains(&source) {
                caller_files.push(source);
            }
        }
    }

    let scores = index.file_scores().clone();
    let mut entries: Vec<CallerEntry> = caller_files
        .into_iter()
        .map(|file| CallerEntry {
            score: scores.get(&file).copied().unwrap_or(0.0),
            sites: Vec::new(),
            file,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file.cmp(&b.file))
    });

    let total = entries.len();
    let mut entries = if params.page.count {
        Vec::new()
    } else {
        params.page.apply(entries)
    };

    if params.context > 0 {
        for entry in &mut entries {
            entry.sites = call_sites(index, &entry.file, &params.symbol, &targets, params.context);
        }
    }

    Ok(CallersResult {
        callers: entries,
        total,
        targets: targets.iter().map(|t| t.key()).collect(),
        suggestions: Vec::new(),
    })
}

/// Call-site lines in one caller file: `\bname\s*\(` matches plus
/// import-like lines mentioning the name, each with ± context lines.
/// Lines inside a target's own span are skipped (self-matches).
fn call_sites(
    index: &CodeIndex,
    caller: &str,
    name: &str,
    targets: &[SymbolNode],
    context: usize,
) -> Vec<CallSite> {
    let Some(source) = index.read_source(caller) else {
        return Vec::new();
    };
    let lines: Vec<&str> = source.lines().collect();

    let call = match Regex::new(&format!(r"\b{}\s*\(", regex::escape(name))) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    let word = match Regex::new(&format!(r"\b{}\b", regex::escape(name))) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    let mut sites = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;
        let inside_target = targets
            .iter()
            .any(|t| t.file == caller && line_no >= t.line_start && line_no <= t.line_end);
        if inside_target {
            continue;
        }

        let is_call = call.is_match(line);
        let is_import = !is_call && is_import_line(line) && word.is_match(line);
        if !is_call && !is_import {
            continue;
        }

        let from = i.saturating_sub(context);
        let to = (i + context + 1).min(lines.len());
        sites.push(CallSite {
            line: line_no,
            excerpt: lines[from..to].iter().map(|l| l.to_string()).collect(),
        });
    }
    sites
}

fn is_import_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    ["import ", "from ", "use ", "require", "#include", "using "]
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}
