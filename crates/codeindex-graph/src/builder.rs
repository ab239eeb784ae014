//! Merging `FileSymbols` records into the graph.
//!
//! Cold builds and incremental updates share one merge path: upsert nodes
//! and `DEFINES` edges, then re-derive every `REFERENCES`/`IMPORTS` edge
//! from the reference tables stored on file nodes. Re-deriving from scratch
//! keeps the two paths byte-for-byte convergent.

use std::collections::HashMap;

use codeindex_core::{symbol_key, FileSymbols};

use crate::graph::{CodeGraph, EdgeKind, FileNode, SymbolNode};
use crate::AMBIGUITY_CAP;

impl CodeGraph {
    /// Cold build from a batch of per-file records.
    pub fn build(records: &[FileSymbols]) -> Self {
        let mut graph = Self::new();
        graph.update(&[], records);
        graph
    }

    /// Incremental update: drop `removed` paths wholesale, merge `added`,
    /// re-resolve all references against the new symbol population.
    pub fn update(&mut self, removed: &[String], added: &[FileSymbols]) {
        for path in removed {
            self.remove_file(path);
        }

        for record in added {
            // Re-parsed files replace their previous nodes entirely.
            if self.contains(&record.file) {
                self.remove_file(&record.file);
            }
            self.upsert_file(FileNode {
                path: record.file.clone(),
                symbol_count: record.definitions.len(),
                references: record.references.clone(),
            });
            for def in &record.definitions {
                self.upsert_symbol(SymbolNode {
                    name: def.name.clone(),
                    kind: def.kind,
                    file: def.file.clone(),
                    line_start: def.line_start,
                    line_end: def.line_end,
                    signature: def.signature.clone(),
                });
                self.add_edge_unique(
                    &record.file,
                    &symbol_key(&def.file, &def.name),
                    EdgeKind::Defines,
                );
            }
        }

        self.resolve_references();
    }

    /// Rebuild the name index and re-derive `REFERENCES`/`IMPORTS` edges
    /// for every file's stored reference table.
    fn resolve_references(&mut self) {
        self.clear_derived_edges();

        // name → [(symbol key, owning file)]
        let mut name_index: HashMap<String, Vec<(String, String)>> = HashMap::new();
        for sym in self.symbols() {
            name_index
                .entry(sym.name.clone())
                .or_default()
                .push((sym.key(), sym.file.clone()));
        }

        // Materialize the work list first; resolution mutates the graph.
        let work: Vec<(String, Vec<String>)> = self
            .files()
            .map(|f| {
                (
                    f.path.clone(),
                    f.references.iter().map(|r| r.name.clone()).collect(),
                )
            })
            .collect();

        for (file, names) in work {
            for name in names {
                let Some(candidates) = name_index.get(&name) else {
                    continue;
                };
                for (key, owner) in disambiguate(candidates, &file) {
                    self.add_edge_unique(&file, &key, EdgeKind::References);
                    if owner != file {
                        self.add_edge_unique(&file, &owner, EdgeKind::Imports);
                    }
                }
            }
        }
    }
}

/// The disambiguation policy: single candidate wires directly; same-file
/// candidates suppress cross-file ones; above the ambiguity cap nothing is
/// wired; otherwise all candidates are.
fn disambiguate(candidates: &[(String, String)], from_file: &str) -> Vec<(String, String)> {
    match candidates.len() {
        0 => Vec::new(),
        1 => candidates.to_vec(),
        _ => {
            let same_file: Vec<(String, String)> = candidates
                .iter()
                .filter(|(_, owner)| owner == from_file)
                .cloned()
                .collect();
            if !same_file.is_empty() {
                same_file
            } else if candidates.len() > AMBIGUITY_CAP {
                Vec::new()
            } else {
                candidates.to_vec()
            }
        }
    }
}
