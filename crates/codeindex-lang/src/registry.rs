//! Static language registry: extension → grammar + compiled queries.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tree_sitter::{Language, Query};

/// Embedded query files, two per language.
mod queries {
    pub const RUST_DEFS: &str = include_str!("../queries/rust-defs.scm");
    pub const RUST_REFS: &str = include_str!("../queries/rust-refs.scm");
    pub const PYTHON_DEFS: &str = include_str!("../queries/python-defs.scm");
    pub const PYTHON_REFS: &str = include_str!("../queries/python-refs.scm");
    pub const JAVASCRIPT_DEFS: &str = include_str!("../queries/javascript-defs.scm");
    pub const JAVASCRIPT_REFS: &str = include_str!("../queries/javascript-refs.scm");
    pub const TYPESCRIPT_DEFS: &str = include_str!("../queries/typescript-defs.scm");
    pub const TYPESCRIPT_REFS: &str = include_str!("../queries/typescript-refs.scm");
    pub const GO_DEFS: &str = include_str!("../queries/go-defs.scm");
    pub const GO_REFS: &str = include_str!("../queries/go-refs.scm");
    pub const JAVA_DEFS: &str = include_str!("../queries/java-defs.scm");
    pub const JAVA_REFS: &str = include_str!("../queries/java-refs.scm");
    pub const C_DEFS: &str = include_str!("../queries/c-defs.scm");
    pub const C_REFS: &str = include_str!("../queries/c-refs.scm");
    pub const CPP_DEFS: &str = include_str!("../queries/cpp-defs.scm");
    pub const CPP_REFS: &str = include_str!("../queries/cpp-refs.scm");
    pub const RUBY_DEFS: &str = include_str!("../queries/ruby-defs.scm");
    pub const RUBY_REFS: &str = include_str!("../queries/ruby-refs.scm");
    pub const C_SHARP_DEFS: &str = include_str!("../queries/c_sharp-defs.scm");
    pub const C_SHARP_REFS: &str = include_str!("../queries/c_sharp-refs.scm");
    pub const PHP_DEFS: &str = include_str!("../queries/php-defs.scm");
    pub const PHP_REFS: &str = include_str!("../queries/php-refs.scm");
}

/// One language's static description.
struct LanguageSpec {
    id: &'static str,
    extensions: &'static [&'static str],
    language: fn() -> Language,
    defs: &'static str,
    refs: &'static str,
    /// Indentation-defined grammar: signatures end at `:`, not `{`.
    colon_signatures: bool,
}

/// A registered language with its compiled queries.
pub struct LanguageHandle {
    pub id: &'static str,
    pub language: Language,
    pub def_query: Query,
    pub ref_query: Query,
    pub colon_signatures: bool,
}

const SPECS: &[LanguageSpec] = &[
    LanguageSpec {
        id: "rust",
        extensions: &["rs"],
        language: || tree_sitter_rust::LANGUAGE.into(),
        defs: queries::RUST_DEFS,
        refs: queries::RUST_REFS,
        colon_signatures: false,
    },
    LanguageSpec {
        id: "python",
        extensions: &["py", "pyi", "pyw"],
        language: || tree_sitter_python::LANGUAGE.into(),
        defs: queries::PYTHON_DEFS,
        refs: queries::PYTHON_REFS,
        colon_signatures: true,
    },
    LanguageSpec {
        id: "javascript",
        extensions: &["js", "mjs", "cjs", "jsx"],
        language: || tree_sitter_javascript::LANGUAGE.into(),
        defs: queries::JAVASCRIPT_DEFS,
        refs: queries::JAVASCRIPT_REFS,
        colon_signatures: false,
    },
    LanguageSpec {
        id: "typescript",
        extensions: &["ts", "mts", "cts"],
        language: || tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        defs: queries::TYPESCRIPT_DEFS,
        refs: queries::TYPESCRIPT_REFS,
        colon_signatures: false,
    },
    LanguageSpec {
        id: "tsx",
        extensions: &["tsx"],
        language: || tree_sitter_typescript::LANGUAGE_TSX.into(),
        defs: queries::TYPESCRIPT_DEFS,
        refs: queries::TYPESCRIPT_REFS,
        colon_signatures: false,
    },
    LanguageSpec {
        id: "go",
        extensions: &["go"],
        language: || tree_sitter_go::LANGUAGE.into(),
        defs: queries::GO_DEFS,
        refs: queries::GO_REFS,
        colon_signatures: false,
    },
    LanguageSpec {
        id: "java",
        extensions: &["java"],
        language: || tree_sitter_java::LANGUAGE.into(),
        defs: queries::JAVA_DEFS,
        refs: queries::JAVA_REFS,
        colon_signatures: false,
    },
    LanguageSpec {
        id: "c",
        extensions: &["c", "h"],
        language: || tree_sitter_c::LANGUAGE.into(),
        defs: queries::C_DEFS,
        refs: queries::C_REFS,
        colon_signatures: false,
    },
    LanguageSpec {
        id: "cpp",
        extensions: &["cpp", "cc", "cxx", "hpp", "hxx", "hh"],
        language: || tree_sitter_cpp::LANGUAGE.into(),
        defs: queries::CPP_DEFS,
        refs: queries::CPP_REFS,
        colon_signatures: false,
    },
    LanguageSpec {
        id: "ruby",
        extensions: &["rb", "rake"],
        language: || tree_sitter_ruby::LANGUAGE.into(),
        defs: queries::RUBY_DEFS,
        refs: queries::RUBY_REFS,
        colon_signatures: false,
    },
    LanguageSpec {
        id: "c_sharp",
        extensions: &["cs"],
        language: || tree_sitter_c_sharp::LANGUAGE.into(),
        defs: queries::C_SHARP_DEFS,
        refs: queries::C_SHARP_REFS,
        colon_signatures: false,
    },
    LanguageSpec {
        id: "php",
        extensions: &["php", "phtml"],
        language: || tree_sitter_php::LANGUAGE_PHP.into(),
        defs: queries::PHP_DEFS,
        refs: queries::PHP_REFS,
        colon_signatures: false,
    },
];

/// Compiled handles, keyed by language id. A query that fails to compile
/// (grammar/query version skew) disables that language; indexing continues
/// without it.
static HANDLES: Lazy<HashMap<&'static str, LanguageHandle>> = Lazy::new(|| {
    let mut handles = HashMap::new();
    for spec in SPECS {
        let language = (spec.language)();
        let def_query = match Query::new(&language, spec.defs) {
            Ok(q) => q,
            Err(err) => {
                tracing::warn!("disabling {}: definition query failed: {err}", spec.id);
                continue;
            }
        };
        let ref_query = match Query::new(&language, spec.refs) {
            Ok(q) => q,
            Err(err) => {
                tracing::warn!("disabling {}: reference query failed: {err}", spec.id);
                continue;
            }
        };
        handles.insert(
            spec.id,
            LanguageHandle {
                id: spec.id,
                language,
                def_query,
                ref_query,
                colon_signatures: spec.colon_signatures,
            },
        );
    }
    handles
});

static EXTENSION_TO_ID: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for spec in SPECS {
        if HANDLES.contains_key(spec.id) {
            for ext in spec.extensions {
                map.insert(*ext, spec.id);
            }
        }
    }
    map
});

/// Look up the language handle for a file extension.
pub fn resolve(extension: &str) -> Option<&'static LanguageHandle> {
    let id = EXTENSION_TO_ID.get(extension)?;
    HANDLES.get(id)
}

/// Every extension with a working grammar; feeds file discovery.
pub fn supported_extensions() -> Vec<&'static str> {
    let mut extensions: Vec<&'static str> = EXTENSION_TO_ID.keys().copied().collect();
    extensions.sort_unstable();
    extensions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_extensions_resolve() {
        for ext in ["rs", "py", "js", "jsx", "ts", "tsx", "go", "java", "c", "cpp", "rb"] {
            assert!(resolve(ext).is_some(), "expected a grammar for .{ext}");
        }
    }

    #[test]
    fn unknown_extension_is_none() {
        assert!(resolve("xyz").is_none());
        assert!(resolve("").is_none());
    }

    #[test]
    fn python_uses_colon_signatures() {
        assert!(resolve("py").unwrap().colon_signatures);
        assert!(!resolve("rs").unwrap().colon_signatures);
    }

    #[test]
    fn def_queries_expose_both_captures() {
        for ext in ["rs", "py", "ts", "go"] {
            let handle = resolve(ext).unwrap();
            assert!(handle.def_query.capture_index_for_name("name").is_some());
            assert!(handle
                .def_query
                .capture_index_for_name("definition")
                .is_some());
        }
    }

    #[test]
    fn supported_extensions_are_sorted_and_nonempty() {
        let exts = supported_extensions();
        assert!(exts.contains(&"rs"));
        let mut sorted = exts.clone();
        sorted.sort_unstable();
        assert_eq!(exts, sorted);
    }
}
