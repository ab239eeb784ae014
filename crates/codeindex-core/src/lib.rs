//! codeindex-core: shared types, errors, and configuration for code-index.
//!
//! Everything here is consumed by the language layer, the graph, the cache,
//! and the query engine; nothing here touches tree-sitter or the filesystem
//! beyond config/cache path resolution.

mod config;
mod error;
pub mod filters;
mod types;

pub use config::{
    cache_dir, cache_file_for_root, PathTiers, ProjectConfig, DEFAULT_IGNORES, DEFAULT_PATH_TIERS,
};
pub use error::IndexError;
pub use types::{symbol_key, Definition, FileSymbols, Reference, SymbolKind};
