//! codeindex-lang: grammar registry and per-file symbol extraction.
//!
//! Each supported language contributes a grammar handle plus two tree-sitter
//! query files: one capturing definitions (`@name` inside `@definition`),
//! one capturing the deliberately narrow reference set (bare calls, import
//! identifiers, type identifiers, decorators). Receiver-qualified calls like
//! `obj.method(...)` are intentionally not captured; without type
//! information they cross-wire common names across the whole tree.

mod extract;
mod registry;
mod signature;

pub use extract::extract;
pub use registry::{resolve, supported_extensions, LanguageHandle};
pub use signature::{brace_signature, colon_signature};
