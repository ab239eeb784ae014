//! Per-file symbol extraction: parse, run both queries, emit `FileSymbols`.

use std::cell::RefCell;
use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, QueryCursor};

use codeindex_core::{Definition, FileSymbols, Reference, SymbolKind};

use crate::registry::{self, LanguageHandle};
use crate::signature;

thread_local! {
    // Parsers are not Sync; one per worker thread, re-targeted per file.
    static PARSER: RefCell<Parser> = RefCell::new(Parser::new());
}

/// Extract definitions and references from one source buffer.
///
/// Returns `None` for unsupported extensions and for parser failures; a bad
/// file contributes nothing and indexing continues.
pub fn extract(rel_path: &str, source: &str) -> Option<FileSymbols> {
    let extension = Path::new(rel_path).extension()?.to_str()?;
    let handle = registry::resolve(extension)?;

    let tree = PARSER.with(|parser| {
        let mut parser = parser.borrow_mut();
        parser.set_language(&handle.language).ok()?;
        parser.parse(source, None)
    })?;

    let mut symbols = FileSymbols::new(rel_path);
    let root = tree.root_node();
    let bytes = source.as_bytes();

    collect_definitions(handle, root, bytes, rel_path, &mut symbols);
    collect_references(handle, root, bytes, rel_path, &mut symbols);

    Some(symbols)
}

fn collect_definitions(
    handle: &LanguageHandle,
    root: Node<'_>,
    bytes: &[u8],
    rel_path: &str,
    out: &mut FileSymbols,
) {
    let Some(name_idx) = handle.def_query.capture_index_for_name("name") else {
        return;
    };
    let definition_idx = handle.def_query.capture_index_for_name("definition");

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&handle.def_query, root, bytes);
    while let Some(m) = matches.next() {
        let Some(name_node) = m
            .captures
            .iter()
            .find(|c| c.index == name_idx)
            .map(|c| c.node)
        else {
            continue;
        };
        // The enclosing declaration; falls back to the name node itself.
        let def_node = definition_idx
            .and_then(|idx| m.captures.iter().find(|c| c.index == idx).map(|c| c.node))
            .unwrap_or(name_node);

        let name = name_node.utf8_text(bytes).unwrap_or("");
        if name.is_empty() {
            continue;
        }

        let text = def_node.utf8_text(bytes).unwrap_or("");
        let rendered = if handle.colon_signatures {
            signature::colon_signature(text)
        } else {
            signature::brace_signature(text)
        };

        out.definitions.push(Definition {
            name: name.to_string(),
            kind: kind_for_node(def_node.kind()),
            file: rel_path.to_string(),
            line_start: def_node.start_position().row + 1,
            line_end: def_node.end_position().row + 1,
            signature: rendered,
        });
    }
}

fn collect_references(
    handle: &LanguageHandle,
    root: Node<'_>,
    bytes: &[u8],
    rel_path: &str,
    out: &mut FileSymbols,
) {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&handle.ref_query, root, bytes);
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let name = capture.node.utf8_text(bytes).unwrap_or("");
            if name.is_empty() {
                continue;
            }
            out.references.push(Reference {
                name: name.to_string(),
                file: rel_path.to_string(),
                line: capture.node.start_position().row + 1,
            });
        }
    }
}

/// Fixed mapping from grammar node types to the closed kind set.
fn kind_for_node(node_kind: &str) -> SymbolKind {
    match node_kind {
        "function_item"
        | "function_declaration"
        | "function_definition"
        | "function_signature"
        | "generator_function_declaration"
        | "method_definition"
        | "method_declaration"
        | "method_signature"
        | "constructor_declaration"
        | "method"
        | "singleton_method"
        | "macro_definition" => SymbolKind::Function,
        "struct_item"
        | "struct_specifier"
        | "struct_declaration"
        | "class_declaration"
        | "class_definition"
        | "class_specifier"
        | "class"
        | "abstract_class_declaration"
        | "interface_declaration"
        | "trait_item"
        | "trait_declaration"
        | "impl_item"
        | "record_declaration"
        | "union_item"
        | "union_specifier" => SymbolKind::Class,
        "type_item"
        | "type_alias_declaration"
        | "type_definition"
        | "type_declaration"
        | "enum_item"
        | "enum_declaration"
        | "enum_specifier"
        | "alias_declaration"
        | "annotation_type_declaration"
        | "delegate_declaration" => SymbolKind::Type,
        "variable_declarator"
        | "assignment"
        | "const_item"
        | "static_item"
        | "const_declaration"
        | "var_declaration"
        | "pair" => SymbolKind::Variable,
        "mod_item"
        | "namespace_definition"
        | "namespace_declaration"
        | "internal_module"
        | "module" => SymbolKind::Namespace,
        _ => SymbolKind::Other,
    }
}
