//! codeindex-graph: the heterogeneous file/symbol graph and its ranking
//! kernel.
//!
//! Files and symbols are nodes; `DEFINES`, `REFERENCES`, and `IMPORTS` are
//! typed edges with at-most-one multiplicity per ordered pair per kind.
//! `REFERENCES` and `IMPORTS` are derived state: every merge re-resolves the
//! reference table kept on file nodes, so incremental updates and cold
//! builds converge on identical graphs.

mod builder;
mod graph;
mod pagerank;
mod serialize;

pub use graph::{CodeGraph, EdgeKind, FileNode, NodePayload, SymbolNode};
pub use pagerank::weighted_pagerank;
pub use serialize::GraphDoc;

/// Candidate lists longer than this (with no same-file winner) wire to
/// nothing: too ambiguous to be informative.
pub const AMBIGUITY_CAP: usize = 5;
