//! `outline`: a file skeleton with leaf bodies collapsed, or named symbols
//! expanded in full.

use std::collections::HashMap;

use serde::Serialize;

use codeindex_core::IndexError;
use codeindex_graph::{EdgeKind, SymbolNode};

use crate::{suggest_files, suggest_symbols, CodeIndex};

#[derive(Debug, Clone, Default)]
pub struct OutlineParams {
    pub file: String,
    /// When non-empty, print these symbols' full spans instead of the
    /// collapsed skeleton.
    pub expand_symbols: Vec<String>,
    /// Annotate collapsed bodies with `← N callers`.
    pub caller_counts: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlineResult {
    pub file: String,
    pub text: String,
    pub file_not_found: bool,
    pub suggestions: Vec<String>,
}

pub fn outline(index: &mut CodeIndex, params: OutlineParams) -> Result<OutlineResult, IndexError> {
    index.ensure()?;

    if index.graph().file(&params.file).is_none() {
        let suggestions = suggest_files(index.graph(), &params.file);
        return Ok(OutlineResult {
            file: params.file,
            text: String::new(),
            file_not_found: true,
            suggestions,
        });
    }
    let Some(source) = index.read_source(&params.file) else {
        return Err(IndexError::FileNotFound(params.file));
    };
    let lines: Vec<&str> = source.lines().collect();

    let mut definitions: Vec<SymbolNode> = index
        .graph()
        .symbols_of_file(&params.file)
        .into_iter()
        .cloned()
        .collect();
    definitions.sort_by_key(|d| (d.line_start, d.line_end));

    if !params.expand_symbols.is_empty() {
        return Ok(render_expanded(index, &params, &definitions, &lines));
    }

    let caller_counts = if params.caller_counts {
        external_caller_counts(index, &definitions)
    } else {
        HashMap::new()
    };

    let text = render_skeleton(&definitions, &lines, &caller_counts);
    Ok(OutlineResult {
        file: params.file,
        text,
        file_not_found: false,
        suggestions: Vec::new(),
    })
}

/// A definition is a container when it encloses another definition; only
/// leaves collapse.
fn is_container(def: &SymbolNode, all: &[SymbolNode]) -> bool {
    all.iter().any(|other| {
        (other.line_start, other.line_end) != (def.line_start, def.line_end)
            && def.line_start <= other.line_start
            && other.line_end <= def.line_end
    })
}

fn render_skeleton(
    definitions: &[SymbolNode],
    lines: &[&str],
    caller_counts: &HashMap<String, usize>,
) -> String {
    let mut out = String::new();
    let mut line_no = 1usize;

    while line_no <= lines.len() {
        let leaf = definitions.iter().find(|d| {
            d.line_start == line_no
                && d.line_end > d.line_start
                && !is_container(d, definitions)
                && d.line_end - d.line_start >= 2
        });

        match leaf {
            Some(def) => {
                out.push_str(&format!("{:>4}│ {}\n", line_no, lines[line_no - 1]));
                let body_lines = def.line_end - def.line_start;
                let annotation = caller_counts
                    .get(&def.key())
                    .map(|n| format!("  ← {n} callers"))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "    │   ... ({body_lines} lines){annotation}\n"
                ));
                line_no = def.line_end + 1;
            }
            None => {
                out.push_str(&format!("{:>4}│ {}\n", line_no, lines[line_no - 1]));
                line_no += 1;
            }
        }
    }
    out
}

fn render_expanded(
    index: &CodeIndex,
    params: &OutlineParams,
    definitions: &[SymbolNode],
    lines: &[&str],
) -> OutlineResult {
    let mut out = String::new();
    let mut matched_any = false;

    for wanted in &params.expand_symbols {
        let matches: Vec<&SymbolNode> = definitions
            .iter()
            .filter(|d| d.name.eq_ignore_ascii_case(wanted))
            .collect();
        for def in matches {
            matched_any = true;
            for line_no in def.line_start..=def.line_end.min(lines.len()) {
                out.push_str(&format!("{:>4}│ {}\n", line_no, lines[line_no - 1]));
            }
            out.push('\n');
        }
    }

    let suggestions = if matched_any {
        Vec::new()
    } else {
        params
            .expand_symbols
            .iter()
            .flat_map(|name| suggest_symbols(index.graph(), name))
            .collect()
    };

    OutlineResult {
        file: params.file.clone(),
        text: out,
        file_not_found: false,
        suggestions,
    }
}

fn external_caller_counts(
    index: &CodeIndex,
    definitions: &[SymbolNode],
) -> HashMap<String, usize> {
    definitions
        .iter()
        .map(|def| {
            let count = index
                .graph()
                .in_neighbors(&def.key(), EdgeKind::References)
                .iter()
                .filter(|source| source.as_str() != def.file)
                .count();
            (def.key(), count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}
