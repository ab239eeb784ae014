//! Project configuration and cache path resolution.
//!
//! Projects may append ignore patterns and path-tier weights via a JSON file
//! at `<root>/.code-index/config.json`:
//!
//! ```json
//! {"ignore": ["generated"], "pathTiers": {"experiments/": 0.5}}
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Directories never worth indexing: dependencies, build output, VCS and
/// tool caches, scratch paths. Patterns match whole path segments or
/// segment-boundary prefixes.
pub const DEFAULT_IGNORES: &[&str] = &[
    // Dependencies
    "node_modules",
    "vendor",
    ".venv",
    "venv",
    "site-packages",
    "bower_components",
    "target/debug",
    "target/release",
    // Build output
    "dist",
    "build",
    "out",
    "coverage",
    ".next",
    ".nuxt",
    "__pycache__",
    ".gradle",
    // VCS and tool caches
    ".git",
    ".hg",
    ".svn",
    ".code-index",
    ".cache",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    ".tox",
    ".terraform",
    ".idea",
    ".vscode",
    // Scratch
    "tmp",
    "temp",
    ".scratch",
];

/// Default path-tier dampening: areas whose symbols matter less than their
/// graph centrality suggests. First matching pattern wins; everything else
/// gets weight 1.0.
pub const DEFAULT_PATH_TIERS: &[(&str, f64)] = &[
    ("tests/", 0.2),
    ("test/", 0.2),
    ("__tests__/", 0.2),
    ("spec/", 0.2),
    ("scripts/", 0.3),
    ("deploy/", 0.3),
    ("tmp/", 0.2),
    ("temp/", 0.2),
    ("qa/", 0.3),
];

/// Per-project configuration appended to the built-in tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Extra ignore patterns, same matching rules as [`DEFAULT_IGNORES`].
    pub ignore: Vec<String>,
    /// Extra path-tier weights, checked before the defaults.
    pub path_tiers: BTreeMap<String, f64>,
}

impl ProjectConfig {
    /// Path of the config file under a project root.
    pub fn path_for(root: &Path) -> PathBuf {
        root.join(".code-index").join("config.json")
    }

    /// Load the project config, falling back to defaults when the file is
    /// missing or unparsable. A broken config must never block indexing.
    pub fn load_or_default(root: &Path) -> Self {
        let path = Self::path_for(root);
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!("ignoring unparsable {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Built-in ignore patterns merged with the project's additions.
    pub fn merged_ignores(&self) -> Vec<String> {
        let mut patterns: Vec<String> = DEFAULT_IGNORES.iter().map(|p| p.to_string()).collect();
        patterns.extend(self.ignore.iter().cloned());
        patterns
    }

    /// Path tiers with project entries checked before the defaults.
    pub fn merged_path_tiers(&self) -> PathTiers {
        let mut entries: Vec<(String, f64)> = self
            .path_tiers
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.extend(
            DEFAULT_PATH_TIERS
                .iter()
                .map(|(k, v)| (k.to_string(), *v)),
        );
        PathTiers { entries }
    }
}

/// Ordered path-prefix → weight rules for rank dampening.
#[derive(Debug, Clone, Default)]
pub struct PathTiers {
    entries: Vec<(String, f64)>,
}

impl PathTiers {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    /// Weight for a relative path: the first pattern matching as a path
    /// prefix or as a `/`-separated segment prefix; 1.0 otherwise.
    pub fn weight_for(&self, path: &str) -> f64 {
        for (pattern, weight) in &self.entries {
            let pat = pattern.trim_end_matches('/');
            if pat.is_empty() {
                continue;
            }
            if path == pat
                || path.starts_with(&format!("{pat}/"))
                || path.contains(&format!("/{pat}/"))
            {
                return *weight;
            }
        }
        1.0
    }
}

/// Root directory for persisted caches.
///
/// `CODE_INDEX_CACHE_DIR` overrides the platform default
/// (`$XDG_CACHE_HOME/code-index` and friends via `dirs`).
pub fn cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CODE_INDEX_CACHE_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::cache_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cache")
        })
        .join("code-index")
}

/// Cache file for one project root: `<hex16(sha256(root))>.json`.
pub fn cache_file_for_root(root: &Path) -> PathBuf {
    let canonical = root
        .canonicalize()
        .unwrap_or_else(|_| root.to_path_buf());
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string_lossy().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    cache_dir().join(format!("{}.json", &digest[..16]))
}
