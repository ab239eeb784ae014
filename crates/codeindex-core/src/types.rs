//! Symbol records exchanged between the extractor and the graph builder.

use serde::{Deserialize, Serialize};

use crate::IndexError;

/// The kind of an extracted symbol.
///
/// A closed set shared by every language; grammar node types map onto it via
/// a fixed table in the language layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
    Type,
    Variable,
    Namespace,
    Other,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Class => write!(f, "class"),
            Self::Type => write!(f, "type"),
            Self::Variable => write!(f, "variable"),
            Self::Namespace => write!(f, "namespace"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for SymbolKind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "function" => Ok(Self::Function),
            "class" => Ok(Self::Class),
            "type" => Ok(Self::Type),
            "variable" => Ok(Self::Variable),
            "namespace" => Ok(Self::Namespace),
            "other" => Ok(Self::Other),
            _ => Err(IndexError::Usage(format!("invalid symbol kind: {s}"))),
        }
    }
}

/// A symbol definition extracted from source.
///
/// Lines are 1-based and inclusive; `line_start <= line_end` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Identifier text.
    pub name: String,
    pub kind: SymbolKind,
    /// Relative path of the defining file.
    pub file: String,
    pub line_start: usize,
    pub line_end: usize,
    /// Single-line rendering of the declaration head.
    pub signature: String,
}

/// A bare mention of a symbol name (call target, import, type position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    /// Relative path of the referencing file.
    pub file: String,
    /// 1-based line of the mention.
    pub line: usize,
}

/// Everything extracted from one file; lives only across a single
/// extract-then-merge transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSymbols {
    /// Relative path of the file.
    pub file: String,
    pub definitions: Vec<Definition>,
    pub references: Vec<Reference>,
}

impl FileSymbols {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            definitions: Vec::new(),
            references: Vec::new(),
        }
    }
}

/// Graph id of a symbol node: `<file>::<name>`.
pub fn symbol_key(file: &str, name: &str) -> String {
    format!("{file}::{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_display_round_trips() {
        for kind in [
            SymbolKind::Function,
            SymbolKind::Class,
            SymbolKind::Type,
            SymbolKind::Variable,
            SymbolKind::Namespace,
            SymbolKind::Other,
        ] {
            let parsed = SymbolKind::from_str(&kind.to_string()).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn invalid_kind_is_usage_error() {
        assert!(matches!(
            SymbolKind::from_str("widget"),
            Err(IndexError::Usage(_))
        ));
    }

    #[test]
    fn symbol_key_format() {
        assert_eq!(symbol_key("src/lib.rs", "parse"), "src/lib.rs::parse");
    }
}
