//! Persisted form of the graph: node lists plus the derived edge triples.

use serde::{Deserialize, Serialize};

use crate::graph::{CodeGraph, EdgeKind, FileNode, SymbolNode};

/// Serializable snapshot of a [`CodeGraph`]. Stored inside the versioned
/// cache document next to the mtime map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDoc {
    pub files: Vec<FileNode>,
    pub symbols: Vec<SymbolNode>,
    pub edges: Vec<(String, String, EdgeKind)>,
}

impl GraphDoc {
    /// Snapshot the graph with stable ordering, so equal graphs serialize
    /// to equal documents.
    pub fn from_graph(graph: &CodeGraph) -> Self {
        let mut files: Vec<FileNode> = graph.files().cloned().collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut symbols: Vec<SymbolNode> = graph.symbols().cloned().collect();
        symbols.sort_by(|a, b| a.key().cmp(&b.key()));

        let mut edges = graph.edges();
        edges.sort_by(|a, b| (&a.0, &a.1, a.2 as u8).cmp(&(&b.0, &b.1, b.2 as u8)));

        Self {
            files,
            symbols,
            edges,
        }
    }

    /// Rebuild the in-memory graph from a snapshot.
    pub fn into_graph(self) -> CodeGraph {
        let mut graph = CodeGraph::new();
        for file in self.files {
            graph.upsert_file(file);
        }
        for symbol in self.symbols {
            graph.upsert_symbol(symbol);
        }
        for (src, dst, kind) in self.edges {
            graph.add_edge_unique(&src, &dst, kind);
        }
        graph
    }
}
