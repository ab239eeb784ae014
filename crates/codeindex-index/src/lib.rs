//! codeindex-index: the mtime-based incremental cache.
//!
//! `ensure()` is the single entry point every query goes through: walk the
//! tree, classify changes by modification time, re-extract only what moved,
//! hand the delta to the graph builder, persist. Parsing is the one
//! parallel hotspot (rayon); graph mutation stays single-threaded.

mod discovery;
mod persist;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use codeindex_core::{cache_file_for_root, FileSymbols, IndexError, PathTiers, ProjectConfig};
use codeindex_graph::CodeGraph;

pub use persist::CACHE_VERSION;

/// What one `ensure()` pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub changed: usize,
    pub deleted: usize,
    pub scanned: usize,
}

impl ScanReport {
    /// Whether ranking caches derived from the graph must be invalidated.
    pub fn dirty(&self) -> bool {
        self.changed + self.deleted > 0
    }
}

/// The per-root index session: graph, mtime map, and persistence.
pub struct IndexCache {
    root: PathBuf,
    ignores: Vec<String>,
    path_tiers: PathTiers,
    extensions: Vec<&'static str>,
    mtimes: BTreeMap<String, u64>,
    graph: CodeGraph,
    initialized: bool,
    cache_path: PathBuf,
}

impl IndexCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let cache_path = cache_file_for_root(&root);
        Self::with_cache_file(root, cache_path)
    }

    /// Explicit cache location; tests use this to avoid the shared platform
    /// cache directory.
    pub fn with_cache_file(root: impl Into<PathBuf>, cache_path: PathBuf) -> Self {
        let root = root.into();
        let config = ProjectConfig::load_or_default(&root);
        Self {
            ignores: config.merged_ignores(),
            path_tiers: config.merged_path_tiers(),
            extensions: codeindex_lang::supported_extensions(),
            mtimes: BTreeMap::new(),
            graph: CodeGraph::new(),
            initialized: false,
            cache_path,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn graph(&self) -> &CodeGraph {
        &self.graph
    }

    pub fn path_tiers(&self) -> &PathTiers {
        &self.path_tiers
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn tracked_files(&self) -> usize {
        self.mtimes.len()
    }

    /// Bring the graph in sync with the tree on disk.
    ///
    /// First call loads the persisted cache if one exists; every call walks
    /// the tree, re-extracts changed files in parallel, applies the delta
    /// incrementally, and persists the result when anything moved.
    pub fn ensure(&mut self) -> Result<ScanReport, IndexError> {
        if !self.initialized {
            if let Some((graph, mtimes)) = persist::load(&self.cache_path) {
                tracing::debug!(
                    "loaded cache for {} ({} files tracked)",
                    self.root.display(),
                    mtimes.len()
                );
                self.graph = graph;
                self.mtimes = mtimes;
            }
            self.initialized = true;
        }

        let files = discovery::discover_files(&self.root, &self.ignores, &self.extensions)?;
        let scanned = files.len();

        let mut changed: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::with_capacity(files.len());
        for rel in &files {
            seen.insert(rel.as_str());
            let Some(mtime) = discovery::mtime_millis(&self.root.join(rel)) else {
                continue;
            };
            let newer = match self.mtimes.get(rel) {
                Some(&previous) => mtime > previous,
                None => true,
            };
            if newer {
                changed.push(rel.clone());
                self.mtimes.insert(rel.clone(), mtime);
            }
        }

        let deleted: Vec<String> = self
            .mtimes
            .keys()
            .filter(|path| !seen.contains(path.as_str()))
            .cloned()
            .collect();
        for path in &deleted {
            self.mtimes.remove(path);
        }

        let report = ScanReport {
            changed: changed.len(),
            deleted: deleted.len(),
            scanned,
        };
        if !report.dirty() {
            return Ok(report);
        }

        // The only parallel hotspot: extraction of the changed set.
        let root = self.root.clone();
        let records: Vec<FileSymbols> = changed
            .par_iter()
            .filter_map(|rel| {
                let source = match std::fs::read_to_string(root.join(rel)) {
                    Ok(s) => s,
                    Err(err) => {
                        tracing::warn!("skipping unreadable {rel}: {err}");
                        return None;
                    }
                };
                codeindex_lang::extract(rel, &source)
            })
            .collect();

        let mut removed = deleted;
        removed.extend(changed);
        self.graph.update(&removed, &records);

        if let Err(err) = persist::save(&self.cache_path, &self.graph, &self.mtimes) {
            tracing::warn!("failed to persist cache {}: {err}", self.cache_path.display());
        }

        tracing::info!(
            "indexed {}: {} changed, {} deleted, {} scanned",
            self.root.display(),
            report.changed,
            report.deleted,
            report.scanned
        );
        Ok(report)
    }

    /// Drop everything (memory and disk) and rebuild cold.
    pub fn reindex(&mut self) -> Result<ScanReport, IndexError> {
        self.graph = CodeGraph::new();
        self.mtimes.clear();
        self.initialized = true;
        let _ = std::fs::remove_file(&self.cache_path);
        self.ensure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use std::time::Duration;

    struct Fixture {
        root: PathBuf,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let root = std::env::temp_dir().join(format!("codeindex_cache_{name}"));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(&root).unwrap();
            Self { root }
        }

        fn cache(&self) -> IndexCache {
            IndexCache::with_cache_file(&self.root, self.root.join(".cache-doc.json"))
        }

        fn write(&self, rel: &str, content: &str) {
            let path = self.root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    fn edge_set(graph: &CodeGraph) -> BTreeSet<String> {
        graph
            .edges()
            .into_iter()
            .map(|(s, d, k)| format!("{s}|{d}|{k}"))
            .collect()
    }

    #[test]
    fn cold_build_then_clean_rescan() {
        let fx = Fixture::new("cold");
        fx.write("src/a.rs", "pub fn alpha() {}\n");
        fx.write("src/b.rs", "fn beta() { alpha(); }\n");

        let mut cache = fx.cache();
        let first = cache.ensure().unwrap();
        assert_eq!(first.changed, 2);
        assert_eq!(first.deleted, 0);
        assert_eq!(first.scanned, 2);
        assert!(cache.graph().symbol("src/a.rs::alpha").is_some());

        let second = cache.ensure().unwrap();
        assert_eq!(second, ScanReport { changed: 0, deleted: 0, scanned: 2 });
    }

    #[test]
    fn modified_file_is_reextracted() {
        let fx = Fixture::new("modified");
        fx.write("src/a.rs", "pub fn alpha() {}\n");

        let mut cache = fx.cache();
        cache.ensure().unwrap();
        assert!(cache.graph().symbol("src/a.rs::alpha").is_some());

        std::thread::sleep(Duration::from_millis(20));
        fx.write("src/a.rs", "pub fn gamma() {}\n");

        let report = cache.ensure().unwrap();
        assert_eq!(report.changed, 1);
        assert!(cache.graph().symbol("src/a.rs::alpha").is_none());
        assert!(cache.graph().symbol("src/a.rs::gamma").is_some());
    }

    #[test]
    fn deleted_file_is_dropped() {
        let fx = Fixture::new("deleted");
        fx.write("src/a.rs", "pub fn alpha() {}\n");
        fx.write("src/b.rs", "fn beta() { alpha(); }\n");

        let mut cache = fx.cache();
        cache.ensure().unwrap();
        assert!(cache
            .graph()
            .has_edge("src/b.rs", "src/a.rs", codeindex_graph::EdgeKind::Imports));

        fs::remove_file(fx.root.join("src/a.rs")).unwrap();
        let report = cache.ensure().unwrap();
        assert_eq!(report.deleted, 1);
        assert!(cache.graph().file("src/a.rs").is_none());
        assert!(cache
            .graph()
            .out_neighbors("src/b.rs", codeindex_graph::EdgeKind::Imports)
            .is_empty());
    }

    #[test]
    fn cache_survives_a_new_session() {
        // R3: ensure() over a warm cache equals a cold reindex().
        let fx = Fixture::new("warm");
        fx.write("src/a.rs", "pub fn alpha() {}\n");
        fx.write("src/b.rs", "fn beta() { alpha(); }\n");

        let mut warm = fx.cache();
        warm.ensure().unwrap();

        let mut second = fx.cache();
        let report = second.ensure().unwrap();
        assert_eq!(report.changed, 0, "warm cache should see a clean tree");

        let mut cold = fx.cache();
        cold.reindex().unwrap();

        assert_eq!(edge_set(second.graph()), edge_set(cold.graph()));
        assert_eq!(second.graph().node_count(), cold.graph().node_count());
    }

    #[test]
    fn corrupt_cache_triggers_cold_build() {
        let fx = Fixture::new("corrupt");
        fx.write("src/a.rs", "pub fn alpha() {}\n");
        fs::write(fx.root.join(".cache-doc.json"), "garbage").unwrap();

        let mut cache = fx.cache();
        let report = cache.ensure().unwrap();
        assert_eq!(report.changed, 1);
        assert!(cache.graph().symbol("src/a.rs::alpha").is_some());
    }

    #[test]
    fn unparsable_file_contributes_nothing() {
        let fx = Fixture::new("binary");
        fx.write("src/a.rs", "pub fn alpha() {}\n");
        fs::write(fx.root.join("src/junk.rs"), [0xFFu8, 0xFE, 0x00, 0x01]).unwrap();

        let mut cache = fx.cache();
        let report = cache.ensure().unwrap();
        assert_eq!(report.scanned, 2);
        assert!(cache.graph().symbol("src/a.rs::alpha").is_some());
        assert!(cache.graph().file("src/junk.rs").is_none());
    }
}
