//! `context`: everything needed to read one symbol in isolation — its
//! definition, the symbols its body uses, previews of the types in its
//! signature, and the files that call it.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use codeindex_core::{IndexError, SymbolKind};
use codeindex_graph::{EdgeKind, SymbolNode};

use crate::search::hit_for;
use crate::{suggest_symbols, CodeIndex, SymbolHit};

/// Generic names that would match in nearly any body; scanning skips them.
static STOPWORDS: &[&str] = &[
    "get", "set", "add", "remove", "new", "init", "run", "main", "start", "stop", "open", "close",
    "read", "write", "load", "save", "create", "update", "delete", "next", "prev", "push", "pop",
    "len", "size", "data", "value", "name", "type", "key", "keys", "item", "items", "list", "map",
    "node", "file", "path", "line", "text", "result", "error", "err", "test", "log", "print",
    "format", "str", "string", "int", "dict", "self", "this", "super", "args", "kwargs", "true",
    "false", "none", "null",
];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());
static CAPITALIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][A-Za-z0-9_]*\b").unwrap());

const PREVIEW_LINES: usize = 15;

#[derive(Debug, Clone, Default)]
pub struct ContextParams {
    pub symbol: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsedSymbol {
    pub name: String,
    pub file: String,
    pub line_start: usize,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypePreview {
    pub name: String,
    pub file: String,
    pub preview: Vec<String>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextResult {
    pub target: Option<SymbolHit>,
    pub used: Vec<UsedSymbol>,
    pub type_previews: Vec<TypePreview>,
    /// External files with references to any same-name candidate.
    pub callers: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn context(index: &mut CodeIndex, params: ContextParams) -> Result<ContextResult, IndexError> {
    index.ensure()?;

    let candidates: Vec<SymbolNode> = index
        .graph()
        .symbols()
        .filter(|s| s.name == params.symbol)
        .filter(|s| params.file.as_deref().map_or(true, |f| s.file == f))
        .cloned()
        .collect();

    if candidates.is_empty() {
        let suggestions = suggest_symbols(index.graph(), &params.symbol);
        return Ok(ContextResult {
            target: None,
            used: Vec::new(),
            type_previews: Vec::new(),
            callers: Vec::new(),
            suggestions,
        });
    }

    // Ambiguity is broken by PageRank.
    let ranked: HashMap<String, f64> = index.ranked().iter().cloned().collect();
    let target = candidates
        .iter()
        .max_by(|a, b| {
            let sa = ranked.get(&a.key()).copied().unwrap_or(0.0);
            let sb = ranked.get(&b.key()).copied().unwrap_or(0.0);
            sa.partial_cmp(&sb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.key().cmp(&a.key()))
        })
        .cloned()
        .expect("candidates are non-empty");

    let used = used_symbols(index, &target, &ranked);
    let type_previews = signature_type_previews(index, &target);

    // External caller files, unioned across all same-name candidates.
    let mut callers: Vec<String> = Vec::new();
    for candidate in &candidates {
        for source in index.graph().in_neighbors(&candidate.key(), EdgeKind::References) {
            if source != candidate.file && !callers.contains(&source) {
                callers.push(source);
            }
        }
    }
    callers.sort();

    let score = ranked.get(&target.key()).copied().unwrap_or(0.0);
    let target_hit = hit_for(index.graph(), &target.key(), score);

    Ok(ContextResult {
        target: target_hit,
        used,
        type_previews,
        callers,
        suggestions: Vec::new(),
    })
}

/// Whole-word scan of the target's body for other known symbol names.
/// Raw-text matching: comments and strings can contribute; the stopword
/// table and the length floor keep the noise down.
fn used_symbols(
    index: &CodeIndex,
    target: &SymbolNode,
    ranked: &HashMap<String, f64>,
) -> Vec<UsedSymbol> {
    let Some(source) = index.read_source(&target.file) else {
        return Vec::new();
    };
    let lines: Vec<&str> = source.lines().collect();
    if target.line_start > lines.len() {
        return Vec::new();
    }
    let body = lines[target.line_start - 1..target.line_end.min(lines.len())].join("\n");

    let mut words: HashSet<&str> = HashSet::new();
    for m in WORD.find_iter(&body) {
        words.insert(m.as_str());
    }

    // Candidate definitions per mentioned name: same file wins, then rank.
    let mut by_name: HashMap<&str, Vec<&SymbolNode>> = HashMap::new();
    for symbol in index.graph().symbols() {
        by_name.entry(symbol.name.as_str()).or_default().push(symbol);
    }

    let mut used: Vec<UsedSymbol> = Vec::new();
    for (name, defs) in &by_name {
        if *name == target.name || name.len() <= 2 {
            continue;
        }
        if STOPWORDS.contains(&name.to_lowercase().as_str()) {
            continue;
        }
        if !words.contains(name) {
            continue;
        }
        let best = defs
            .iter()
            .find(|d| d.file == target.file && d.key() != target.key())
            .or_else(|| {
                defs.iter().max_by(|a, b| {
                    let sa = ranked.get(&a.key()).copied().unwrap_or(0.0);
                    let sb = ranked.get(&b.key()).copied().unwrap_or(0.0);
                    sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
                })
            });
        if let Some(def) = best {
            if def.key() == target.key() {
                continue;
            }
            used.push(UsedSymbol {
                name: def.name.clone(),
                file: def.file.clone(),
                line_start: def.line_start,
                signature: def.signature.clone(),
            });
        }
    }
    used.sort_by(|a, b| a.name.cmp(&b.name));
    used
}

/// Previews for capitalized signature tokens that name known class/type
/// symbols: up to 15 body lines each.
fn signature_type_previews(index: &CodeIndex, target: &SymbolNode) -> Vec<TypePreview> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut previews: Vec<TypePreview> = Vec::new();

    for m in CAPITALIZED.find_iter(&target.signature) {
        let token = m.as_str();
        if token == target.name || !seen.insert(token.to_string()) {
            continue;
        }
        let Some(type_def) = index
            .graph()
            .symbols()
            .find(|s| s.name == token && matches!(s.kind, SymbolKind::Class | SymbolKind::Type))
        else {
            continue;
        };
        let Some(source) = index.read_source(&type_def.file) else {
            continue;
        };
        let lines: Vec<&str> = source.lines().collect();
        if type_def.line_start > lines.len() {
            continue;
        }
        let span = &lines[type_def.line_start - 1..type_def.line_end.min(lines.len())];
        let truncated = span.len() > PREVIEW_LINES;
        previews.push(TypePreview {
            name: token.to_string(),
            file: type_def.file.clone(),
            preview: span
                .iter()
                .take(PREVIEW_LINES)
                .map(|l| l.to_string())
                .collect(),
            truncated,
        });
    }
    previews
}
