//! The graph store: petgraph topology plus string-keyed payload maps.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use codeindex_core::{symbol_key, Reference, SymbolKind};

/// Typed edges between file and symbol nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// file → symbol it owns; exactly one per symbol.
    Defines,
    /// file → symbol it mentions (same or other file).
    References,
    /// file → file, derived from cross-file reference resolution.
    Imports,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defines => write!(f, "DEFINES"),
            Self::References => write!(f, "REFERENCES"),
            Self::Imports => write!(f, "IMPORTS"),
        }
    }
}

/// Payload of a file node. Carries the raw reference table so merges can
/// re-resolve edges from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    pub path: String,
    pub symbol_count: usize,
    pub references: Vec<Reference>,
}

/// Payload of a symbol node; id is `<file>::<name>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolNode {
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub line_start: usize,
    pub line_end: usize,
    pub signature: String,
}

impl SymbolNode {
    pub fn key(&self) -> String {
        symbol_key(&self.file, &self.name)
    }
}

/// Node payload, discriminated the same way the persisted schema is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    File(FileNode),
    Symbol(SymbolNode),
}

/// The heterogeneous code graph.
///
/// Topology lives in a `StableDiGraph` (indices survive node removal, which
/// the incremental path relies on); payloads and the id → index map are kept
/// alongside, keyed by node id strings.
pub struct CodeGraph {
    pub(crate) graph: StableDiGraph<String, EdgeKind>,
    pub(crate) id_to_index: HashMap<String, NodeIndex>,
    pub(crate) nodes: HashMap<String, NodePayload>,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            id_to_index: HashMap::new(),
            nodes: HashMap::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// The file node for a relative path, if indexed.
    pub fn file(&self, path: &str) -> Option<&FileNode> {
        match self.nodes.get(path) {
            Some(NodePayload::File(f)) => Some(f),
            _ => None,
        }
    }

    /// The symbol node for a `<file>::<name>` key.
    pub fn symbol(&self, key: &str) -> Option<&SymbolNode> {
        match self.nodes.get(key) {
            Some(NodePayload::Symbol(s)) => Some(s),
            _ => None,
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &FileNode> {
        self.nodes.values().filter_map(|p| match p {
            NodePayload::File(f) => Some(f),
            _ => None,
        })
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolNode> {
        self.nodes.values().filter_map(|p| match p {
            NodePayload::Symbol(s) => Some(s),
            _ => None,
        })
    }

    /// Symbols owned by one file, via its `DEFINES` edges.
    pub fn symbols_of_file(&self, path: &str) -> Vec<&SymbolNode> {
        self.out_neighbors(path, EdgeKind::Defines)
            .into_iter()
            .filter_map(|id| self.symbol(&id))
            .collect()
    }

    /// Target node ids of `kind` edges leaving `id`.
    pub fn out_neighbors(&self, id: &str, kind: EdgeKind) -> Vec<String> {
        self.neighbors(id, kind, Direction::Outgoing)
    }

    /// Source node ids of `kind` edges arriving at `id`.
    pub fn in_neighbors(&self, id: &str, kind: EdgeKind) -> Vec<String> {
        self.neighbors(id, kind, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, kind: EdgeKind, direction: Direction) -> Vec<String> {
        let Some(&idx) = self.id_to_index.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, direction)
            .filter(|e| *e.weight() == kind)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                self.graph[other].clone()
            })
            .collect()
    }

    /// Whether an edge of `kind` exists from `src` to `dst`.
    pub fn has_edge(&self, src: &str, dst: &str, kind: EdgeKind) -> bool {
        let (Some(&a), Some(&b)) = (self.id_to_index.get(src), self.id_to_index.get(dst)) else {
            return false;
        };
        self.graph.edges_connecting(a, b).any(|e| *e.weight() == kind)
    }

    /// All edges as `(src_id, dst_id, kind)` triples.
    pub fn edges(&self) -> Vec<(String, String, EdgeKind)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].clone(),
                    self.graph[e.target()].clone(),
                    *e.weight(),
                )
            })
            .collect()
    }

    /// All node ids (files and symbols).
    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    // ── Mutation primitives (used by the builder) ─────────────────────────

    pub(crate) fn upsert_file(&mut self, node: FileNode) {
        let id = node.path.clone();
        if let Some(&idx) = self.id_to_index.get(&id) {
            debug_assert!(self.graph.contains_node(idx));
        } else {
            let idx = self.graph.add_node(id.clone());
            self.id_to_index.insert(id.clone(), idx);
        }
        self.nodes.insert(id, NodePayload::File(node));
    }

    /// Insert a symbol node unless the key already exists (first definition
    /// of a name in a file wins). Returns whether it was inserted.
    pub(crate) fn upsert_symbol(&mut self, node: SymbolNode) -> bool {
        let id = node.key();
        if self.id_to_index.contains_key(&id) {
            return false;
        }
        let idx = self.graph.add_node(id.clone());
        self.id_to_index.insert(id.clone(), idx);
        self.nodes.insert(id, NodePayload::Symbol(node));
        true
    }

    /// Add an edge unless one of the same kind already links the pair.
    /// Self-loops are rejected. Returns whether an edge was added.
    pub(crate) fn add_edge_unique(&mut self, src: &str, dst: &str, kind: EdgeKind) -> bool {
        if src == dst {
            return false;
        }
        let (Some(&a), Some(&b)) = (self.id_to_index.get(src), self.id_to_index.get(dst)) else {
            return false;
        };
        if self.graph.edges_connecting(a, b).any(|e| *e.weight() == kind) {
            return false;
        }
        self.graph.add_edge(a, b, kind);
        true
    }

    /// Remove a file node, every symbol node it owns, and all incident
    /// edges. No-op for unknown paths.
    pub(crate) fn remove_file(&mut self, path: &str) {
        let owned: Vec<String> = self
            .symbols()
            .filter(|s| s.file == path)
            .map(|s| s.key())
            .collect();
        for key in owned {
            self.remove_node(&key);
        }
        self.remove_node(path);
    }

    fn remove_node(&mut self, id: &str) {
        if let Some(idx) = self.id_to_index.remove(id) {
            self.graph.remove_node(idx);
            self.nodes.remove(id);
        }
    }

    /// Drop every derived edge (`REFERENCES` and `IMPORTS`), keeping
    /// `DEFINES`. Merges call this before re-resolving the reference tables.
    pub(crate) fn clear_derived_edges(&mut self) {
        let derived: Vec<_> = self
            .graph
            .edge_references()
            .filter(|e| *e.weight() != EdgeKind::Defines)
            .map(|e| e.id())
            .collect();
        for edge in derived {
            self.graph.remove_edge(edge);
        }
    }
}

impl Default for CodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> FileNode {
        FileNode {
            path: path.to_string(),
            symbol_count: 0,
            references: Vec::new(),
        }
    }

    fn symbol(file: &str, name: &str) -> SymbolNode {
        SymbolNode {
            name: name.to_string(),
            kind: SymbolKind::Function,
            file: file.to_string(),
            line_start: 1,
            line_end: 1,
            signature: format!("fn {name}()"),
        }
    }

    #[test]
    fn edge_multiplicity_is_one_per_kind() {
        let mut g = CodeGraph::new();
        g.upsert_file(file("a.rs"));
        g.upsert_symbol(symbol("a.rs", "f"));
        assert!(g.add_edge_unique("a.rs", "a.rs::f", EdgeKind::Defines));
        assert!(!g.add_edge_unique("a.rs", "a.rs::f", EdgeKind::Defines));
        // A different kind between the same pair still goes in.
        assert!(g.add_edge_unique("a.rs", "a.rs::f", EdgeKind::References));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn self_loops_rejected() {
        let mut g = CodeGraph::new();
        g.upsert_file(file("a.rs"));
        assert!(!g.add_edge_unique("a.rs", "a.rs", EdgeKind::Imports));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn duplicate_symbol_key_keeps_first() {
        let mut g = CodeGraph::new();
        g.upsert_file(file("a.rs"));
        let mut first = symbol("a.rs", "f");
        first.line_start = 3;
        first.line_end = 5;
        assert!(g.upsert_symbol(first));
        assert!(!g.upsert_symbol(symbol("a.rs", "f")));
        assert_eq!(g.symbol("a.rs::f").unwrap().line_start, 3);
    }

    #[test]
    fn remove_file_drops_owned_symbols_and_edges() {
        let mut g = CodeGraph::new();
        g.upsert_file(file("a.rs"));
        g.upsert_file(file("b.rs"));
        g.upsert_symbol(symbol("a.rs", "f"));
        g.add_edge_unique("a.rs", "a.rs::f", EdgeKind::Defines);
        g.add_edge_unique("b.rs", "a.rs::f", EdgeKind::References);
        g.add_edge_unique("b.rs", "a.rs", EdgeKind::Imports);

        g.remove_file("a.rs");

        assert!(!g.contains("a.rs"));
        assert!(!g.contains("a.rs::f"));
        assert!(g.contains("b.rs"));
        assert_eq!(g.edge_count(), 0);
        assert!(g.out_neighbors("b.rs", EdgeKind::Imports).is_empty());
    }

    #[test]
    fn neighbors_filter_by_kind() {
        let mut g = CodeGraph::new();
        g.upsert_file(file("a.rs"));
        g.upsert_file(file("b.rs"));
        g.upsert_symbol(symbol("a.rs", "f"));
        g.add_edge_unique("a.rs", "a.rs::f", EdgeKind::Defines);
        g.add_edge_unique("b.rs", "a.rs::f", EdgeKind::References);
        g.add_edge_unique("b.rs", "a.rs", EdgeKind::Imports);

        assert_eq!(g.in_neighbors("a.rs::f", EdgeKind::References), vec!["b.rs"]);
        assert_eq!(g.in_neighbors("a.rs", EdgeKind::Imports), vec!["b.rs"]);
        assert_eq!(g.out_neighbors("b.rs", EdgeKind::Imports), vec!["a.rs"]);
        assert!(g.out_neighbors("b.rs", EdgeKind::Defines).is_empty());
    }
}
