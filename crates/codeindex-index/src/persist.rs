//! The on-disk cache document: `{version, graph, mtimes}` as JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use codeindex_core::IndexError;
use codeindex_graph::{CodeGraph, GraphDoc};

/// Bump when the document schema changes; anything else triggers a cold
/// rebuild on load.
pub const CACHE_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheDocument {
    pub version: u32,
    pub graph: GraphDoc,
    pub mtimes: BTreeMap<String, u64>,
}

/// Load a persisted cache. Missing, unparsable, or wrong-version documents
/// are all treated as "no cache".
pub fn load(path: &Path) -> Option<(CodeGraph, BTreeMap<String, u64>)> {
    let content = std::fs::read_to_string(path).ok()?;
    let document: CacheDocument = match serde_json::from_str(&content) {
        Ok(doc) => doc,
        Err(err) => {
            tracing::warn!("corrupt cache {}: {err}; rebuilding", path.display());
            return None;
        }
    };
    if document.version != CACHE_VERSION {
        tracing::warn!(
            "cache {} has version {}, want {CACHE_VERSION}; rebuilding",
            path.display(),
            document.version
        );
        return None;
    }
    Some((document.graph.into_graph(), document.mtimes))
}

/// Persist the current graph and mtime map.
pub fn save(
    path: &Path,
    graph: &CodeGraph,
    mtimes: &BTreeMap<String, u64>,
) -> Result<(), IndexError> {
    let document = CacheDocument {
        version: CACHE_VERSION,
        graph: GraphDoc::from_graph(graph),
        mtimes: mtimes.clone(),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec(&document)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeindex_core::{Definition, FileSymbols, SymbolKind};

    fn sample_graph() -> CodeGraph {
        CodeGraph::build(&[FileSymbols {
            file: "a.rs".to_string(),
            definitions: vec![Definition {
                name: "f".to_string(),
                kind: SymbolKind::Function,
                file: "a.rs".to_string(),
                line_start: 1,
                line_end: 2,
                signature: "fn f()".to_string(),
            }],
            references: vec![],
        }])
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = std::env::temp_dir().join("codeindex_persist_test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("cache.json");

        let graph = sample_graph();
        let mut mtimes = BTreeMap::new();
        mtimes.insert("a.rs".to_string(), 1234u64);

        save(&path, &graph, &mtimes).unwrap();
        let (loaded, loaded_mtimes) = load(&path).unwrap();

        assert_eq!(loaded.node_count(), graph.node_count());
        assert!(loaded.symbol("a.rs::f").is_some());
        assert_eq!(loaded_mtimes.get("a.rs"), Some(&1234));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_none() {
        assert!(load(Path::new("/nonexistent/cache.json")).is_none());
    }

    #[test]
    fn corrupt_document_is_none() {
        let dir = std::env::temp_dir().join("codeindex_persist_corrupt_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cache.json");

        std::fs::write(&path, "{not json").unwrap();
        assert!(load(&path).is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn wrong_version_is_none() {
        let dir = std::env::temp_dir().join("codeindex_persist_version_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cache.json");

        std::fs::write(
            &path,
            r#"{"version": 99, "graph": {"files": [], "symbols": [], "edges": []}, "mtimes": {}}"#,
        )
        .unwrap();
        assert!(load(&path).is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
