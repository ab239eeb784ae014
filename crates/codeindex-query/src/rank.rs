//! Ranking on a working copy of the graph.
//!
//! The authoritative graph is never mutated: rankings are computed over an
//! index-based edge list, with an optional `__focus__` virtual node whose
//! weighted out-edges bias the walk toward focus files.

use std::collections::HashMap;

use codeindex_core::PathTiers;
use codeindex_graph::{weighted_pagerank, CodeGraph};

const FOCUS_NODE_WEIGHT: f64 = 10.0;
const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-6;

/// Rank all symbol nodes, best first.
///
/// Scores are PageRank over the full graph (every edge weight 1, focus
/// edges weight 10), kept for symbols only, then dampened by the path tier
/// of the owning file. Ties break lexicographically for stable output.
pub fn rank_symbols(
    graph: &CodeGraph,
    focus_files: &[String],
    tiers: &PathTiers,
) -> Vec<(String, f64)> {
    let mut ids = graph.node_ids();
    ids.sort_unstable();
    if ids.is_empty() {
        return Vec::new();
    }

    let index: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut edges: Vec<(usize, usize, f64)> = graph
        .edges()
        .into_iter()
        .filter_map(|(src, dst, _)| {
            Some((*index.get(src.as_str())?, *index.get(dst.as_str())?, 1.0))
        })
        .collect();

    // The virtual focus node exists only in the working copy and its score
    // is dropped with it.
    let mut n = ids.len();
    if !focus_files.is_empty() {
        let focus = n;
        n += 1;
        for file in focus_files {
            if let Some(&target) = index.get(file.as_str()) {
                edges.push((focus, target, FOCUS_NODE_WEIGHT));
            }
        }
    }

    let scores = weighted_pagerank(n, &edges, DAMPING, MAX_ITERATIONS, TOLERANCE);

    let mut ranked: Vec<(String, f64)> = ids
        .iter()
        .enumerate()
        .filter_map(|(i, id)| {
            let symbol = graph.symbol(id)?;
            Some((id.clone(), scores[i] * tiers.weight_for(&symbol.file)))
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked
}

/// File-level score: sum of the file's (adjusted) symbol scores.
pub fn file_scores(graph: &CodeGraph, ranked: &[(String, f64)]) -> HashMap<String, f64> {
    let mut scores: HashMap<String, f64> = graph.files().map(|f| (f.path.clone(), 0.0)).collect();
    for (key, score) in ranked {
        if let Some(symbol) = graph.symbol(key) {
            *scores.entry(symbol.file.clone()).or_insert(0.0) += score;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeindex_core::{Definition, FileSymbols, ProjectConfig, Reference, SymbolKind};

    fn def(file: &str, name: &str) -> Definition {
        Definition {
            name: name.to_string(),
            kind: SymbolKind::Function,
            file: file.to_string(),
            line_start: 1,
            line_end: 2,
            signature: format!("fn {name}()"),
        }
    }

    fn record(file: &str, defs: Vec<Definition>, refs: Vec<&str>) -> FileSymbols {
        FileSymbols {
            file: file.to_string(),
            definitions: defs,
            references: refs
                .into_iter()
                .map(|name| Reference {
                    name: name.to_string(),
                    file: file.to_string(),
                    line: 1,
                })
                .collect(),
        }
    }

    fn tiers() -> PathTiers {
        ProjectConfig::default().merged_path_tiers()
    }

    /// a defines fa; b, c, d each define one function and call fa.
    fn hub_graph() -> CodeGraph {
        CodeGraph::build(&[
            record("a.rs", vec![def("a.rs", "fa")], vec![]),
            record("b.rs", vec![def("b.rs", "fb")], vec!["fa"]),
            record("c.rs", vec![def("c.rs", "fc")], vec!["fa"]),
            record("d.rs", vec![def("d.rs", "fd")], vec!["fa"]),
        ])
    }

    fn score_of(ranked: &[(String, f64)], key: &str) -> f64 {
        ranked
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, s)| *s)
            .expect("missing key")
    }

    #[test]
    fn empty_graph_ranks_empty() {
        // B5 first half
        let graph = CodeGraph::new();
        assert!(rank_symbols(&graph, &[], &tiers()).is_empty());
    }

    #[test]
    fn isolated_file_symbols_score_positive() {
        // B5 second half
        let graph = CodeGraph::build(&[record(
            "solo.rs",
            vec![def("solo.rs", "one"), def("solo.rs", "two")],
            vec![],
        )]);
        let ranked = rank_symbols(&graph, &[], &tiers());
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|(_, s)| *s > 0.0));
    }

    #[test]
    fn imported_file_symbol_ranks_first() {
        // S4 unfocused half: a::fa leads because b, c, d all import a.
        let ranked = rank_symbols(&hub_graph(), &[], &tiers());
        assert_eq!(ranked[0].0, "a.rs::fa");
    }

    #[test]
    fn focus_strictly_raises_focus_file_symbols() {
        // S4 focused half
        let graph = hub_graph();
        let unfocused = rank_symbols(&graph, &[], &tiers());
        let focused = rank_symbols(&graph, &["c.rs".to_string()], &tiers());

        assert!(score_of(&focused, "c.rs::fc") > score_of(&unfocused, "c.rs::fc"));
        assert!(score_of(&focused, "c.rs::fc") > score_of(&focused, "b.rs::fb"));
        assert!(score_of(&focused, "c.rs::fc") > score_of(&focused, "d.rs::fd"));
    }

    #[test]
    fn focus_on_unknown_file_is_harmless() {
        let graph = hub_graph();
        let ranked = rank_symbols(&graph, &["ghost.rs".to_string()], &tiers());
        assert_eq!(ranked.len(), 4);
    }

    #[test]
    fn path_tier_dampens_test_symbols() {
        // S6: identical centrality, 1 : 0.2 after dampening.
        let graph = CodeGraph::build(&[
            record("src/foo.ts", vec![def("src/foo.ts", "alpha")], vec![]),
            record("tests/foo.ts", vec![def("tests/foo.ts", "beta")], vec![]),
        ]);
        let ranked = rank_symbols(&graph, &[], &tiers());
        let src = score_of(&ranked, "src/foo.ts::alpha");
        let test = score_of(&ranked, "tests/foo.ts::beta");
        assert!((src / test - 5.0).abs() < 1e-9, "ratio was {}", src / test);
    }

    #[test]
    fn file_scores_sum_symbols() {
        let graph = CodeGraph::build(&[record(
            "a.rs",
            vec![def("a.rs", "one"), def("a.rs", "two")],
            vec![],
        )]);
        let ranked = rank_symbols(&graph, &[], &tiers());
        let files = file_scores(&graph, &ranked);
        let expected: f64 = ranked.iter().map(|(_, s)| s).sum();
        assert!((files["a.rs"] - expected).abs() < 1e-12);
    }
}
