//! `neighborhood`: the ranked local import neighborhood of one file.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use codeindex_core::IndexError;
use codeindex_graph::EdgeKind;

use crate::search::hit_for;
use crate::{suggest_files, CodeIndex, SymbolHit};

#[derive(Debug, Clone)]
pub struct NeighborhoodParams {
    pub file: String,
    pub hops: usize,
    pub include_dependents: bool,
    pub max_files: usize,
    pub count: bool,
}

impl Default for NeighborhoodParams {
    fn default() -> Self {
        Self {
            file: String::new(),
            hops: 2,
            include_dependents: true,
            max_files: 15,
            count: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NeighborFile {
    pub file: String,
    pub hops: usize,
    pub direct: bool,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NeighborhoodCounts {
    pub total_files: usize,
    pub total_symbols: usize,
    pub total_edges: usize,
    pub total_visited: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NeighborhoodResult {
    pub file: String,
    pub files: Vec<NeighborFile>,
    /// IMPORTS edges incident on the start file whose other endpoint is
    /// kept, as `(from, to)` pairs.
    pub edges: Vec<(String, String)>,
    pub symbols: Vec<SymbolHit>,
    pub counts: Option<NeighborhoodCounts>,
    pub file_not_found: bool,
    pub suggestions: Vec<String>,
}

pub fn neighborhood(
    index: &mut CodeIndex,
    params: NeighborhoodParams,
) -> Result<NeighborhoodResult, IndexError> {
    index.ensure()?;

    if index.graph().file(&params.file).is_none() {
        let suggestions = suggest_files(index.graph(), &params.file);
        return Ok(NeighborhoodResult {
            file: params.file,
            files: Vec::new(),
            edges: Vec::new(),
            symbols: Vec::new(),
            counts: None,
            file_not_found: true,
            suggestions,
        });
    }

    // Forward BFS over IMPORTS up to the hop budget.
    let graph = index.graph();
    let mut file_hops: HashMap<String, usize> = HashMap::new();
    file_hops.insert(params.file.clone(), 0);
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((params.file.clone(), 0));
    while let Some((current, depth)) = queue.pop_front() {
        if depth >= params.hops {
            continue;
        }
        for next in graph.out_neighbors(&current, EdgeKind::Imports) {
            if !file_hops.contains_key(&next) {
                file_hops.insert(next.clone(), depth + 1);
                queue.push_back((next, depth + 1));
            }
        }
    }

    // One backward hop for direct dependents.
    let direct_dependents: Vec<String> = if params.include_dependents {
        graph.in_neighbors(&params.file, EdgeKind::Imports)
    } else {
        Vec::new()
    };
    for dependent in &direct_dependents {
        file_hops.entry(dependent.clone()).or_insert(1);
    }

    let mut direct: HashSet<String> = HashSet::new();
    direct.insert(params.file.clone());
    direct.extend(graph.out_neighbors(&params.file, EdgeKind::Imports));
    direct.extend(direct_dependents.iter().cloned());

    let total_visited = file_hops.len();

    // Focus-biased ranking around the start file drives the score.
    let focused = index.ranked_focused(&[params.file.clone()]);
    let focused_files = crate::rank::file_scores(index.graph(), &focused);

    let mut scored: Vec<NeighborFile> = file_hops
        .iter()
        .map(|(file, &hops)| {
            let is_direct = direct.contains(file);
            let rank = focused_files.get(file).copied().unwrap_or(0.0);
            NeighborFile {
                file: file.clone(),
                hops,
                direct: is_direct,
                score: (if is_direct { 1e6 } else { 0.0 }) + rank * 1e4 - hops as f64,
            }
        })
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file.cmp(&b.file))
    });

    // Keep every direct neighbor, then fill with further hops up to the cap.
    let mut kept: Vec<NeighborFile> = Vec::new();
    for entry in scored {
        if entry.direct || kept.len() < params.max_files {
            kept.push(entry);
        }
    }
    let kept_set: HashSet<&str> = kept.iter().map(|f| f.file.as_str()).collect();

    let graph = index.graph();
    let mut edges: Vec<(String, String)> = Vec::new();
    for to in graph.out_neighbors(&params.file, EdgeKind::Imports) {
        if kept_set.contains(to.as_str()) {
            edges.push((params.file.clone(), to));
        }
    }
    for from in graph.in_neighbors(&params.file, EdgeKind::Imports) {
        if kept_set.contains(from.as_str()) {
            edges.push((from, params.file.clone()));
        }
    }
    edges.sort();

    // All symbols of kept files, in (focused) rank order.
    let symbols: Vec<SymbolHit> = focused
        .iter()
        .filter_map(|(key, score)| {
            let hit = hit_for(graph, key, *score)?;
            kept_set.contains(hit.file.as_str()).then_some(hit)
        })
        .collect();

    if params.count {
        return Ok(NeighborhoodResult {
            file: params.file,
            files: Vec::new(),
            edges: Vec::new(),
            symbols: Vec::new(),
            counts: Some(NeighborhoodCounts {
                total_files: kept.len(),
                total_symbols: symbols.len(),
                total_edges: edges.len(),
                total_visited,
            }),
            file_not_found: false,
            suggestions: Vec::new(),
        });
    }

    Ok(NeighborhoodResult {
        file: params.file,
        files: kept,
        edges,
        symbols,
        counts: None,
        file_not_found: false,
        suggestions: Vec::new(),
    })
}
