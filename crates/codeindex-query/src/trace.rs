//! `trace`: walk the call graph upward from one symbol.
//!
//! Each hop reports one containing definition per caller file: the first
//! textual call-site line decides the location, the innermost enclosing
//! definition becomes the parent. Files with a reference but no enclosing
//! definition appear as synthetic `<module>` nodes.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;

use codeindex_core::IndexError;
use codeindex_graph::{EdgeKind, SymbolNode};

use crate::{suggest_symbols, CodeIndex};

#[derive(Debug, Clone)]
pub struct TraceParams {
    pub symbol: String,
    pub file: Option<String>,
    pub depth: usize,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            file: None,
            depth: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceNode {
    pub name: String,
    pub file: String,
    pub line: usize,
    pub children: Vec<TraceNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceResult {
    pub roots: Vec<TraceNode>,
    pub suggestions: Vec<String>,
}

pub fn trace(index: &mut CodeIndex, params: TraceParams) -> Result<TraceResult, IndexError> {
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
        return Ok(TraceResult {
            roots: Vec::new(),
            suggestions,
        });
    }

    let mut roots = Vec::new();
    for target in targets {
        let mut visited: HashSet<(String, String)> = HashSet::new();
        visited.insert((target.file.clone(), target.name.clone()));
        let children = callers_of(index, &target.name, &target.file, params.depth, &mut visited);
        roots.push(TraceNode {
            name: target.name.clone(),
            file: target.file.clone(),
            line: target.line_start,
            children,
        });
    }

    Ok(TraceResult {
        roots,
        suggestions: Vec::new(),
    })
}

fn callers_of(
    index: &CodeIndex,
    name: &str,
    file: &str,
    depth: usize,
    visited: &mut HashSet<(String, String)>,
) -> Vec<TraceNode> {
    if depth == 0 {
        return Vec::new();
    }

    let key = codeindex_core::symbol_key(file, name);
    let mut caller_files = index.graph().in_neighbors(&key, EdgeKind::References);
    caller_files.sort();

    let call_re = match Regex::new(&format!(r"\b{}\s*\(", regex::escape(name))) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    let mut children = Vec::new();
    for caller in caller_files {
        let Some(source) = index.read_source(&caller) else {
            continue;
        };
        // First textual call site in the file decides the hop location.
        let call_line = source
            .lines()
            .position(|line| call_re.is_match(line))
            .map(|i| i + 1);
        let Some(call_line) = call_line else {
            continue;
        };

        match containing_definition(index, &caller, call_line, name) {
            Some(container) => {
                let marker = (caller.clone(), container.name.clone());
                if !visited.insert(marker) {
                    continue;
                }
                let grandchildren =
                    callers_of(index, &container.name, &caller, depth - 1, visited);
                children.push(TraceNode {
                    name: container.name.clone(),
                    file: caller,
                    line: container.line_start,
                    children: grandchildren,
                });
            }
            None => {
                let marker = (caller.clone(), "<module>".to_string());
                if !visited.insert(marker) {
                    continue;
                }
                children.push(TraceNode {
                    name: "<module>".to_string(),
                    file: caller,
                    line: call_line,
                    children: Vec::new(),
                });
            }
        }
    }
    children
}

/// The innermost definition in `file` whose span contains `line`, skipping
/// definitions of the traced name itself.
fn containing_definition(
    index: &CodeIndex,
    file: &str,
    line: usize,
    name: &str,
) -> Option<SymbolNode> {
    index
        .graph()
        .symbols_of_file(file)
        .into_iter()
        .filter(|s| s.name != name && s.line_start <= line && line <= s.line_end)
        .min_by_key(|s| s.line_end - s.line_start)
        .cloned()
}
