//! Declaration-head rendering.
//!
//! A signature is the single-line head of a declaration: up to the opening
//! `{` or first line break for brace languages, up to the `:` that follows
//! the closing `)` for indentation-defined ones. Source text is preserved
//! verbatim apart from whitespace-run collapsing; truncation appends `…`.

const BRACE_CAP: usize = 200;
const COLON_CAP: usize = 300;

/// Head of a brace-language declaration.
pub fn brace_signature(text: &str) -> String {
    let cut = text
        .find(|c| c == '{' || c == '\n')
        .unwrap_or(text.len());
    cap(&collapse(&text[..cut]), BRACE_CAP)
}

/// Head of an indentation-language declaration: everything through the
/// terminating `:` after the parameter list (or the first `:` when there is
/// no parameter list).
pub fn colon_signature(text: &str) -> String {
    let search_from = match text.find('(') {
        Some(open) => matching_paren(text, open).map(|close| close + 1).unwrap_or(open),
        None => 0,
    };
    let cut = text[search_from..]
        .find(':')
        .map(|i| search_from + i + 1)
        .unwrap_or_else(|| text.find('\n').unwrap_or(text.len()));
    cap(&collapse(&text[..cut]), COLON_CAP)
}

/// Byte offset of the `)` matching the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cap(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut capped: String = text.chars().take(max).collect();
        capped.push('…');
        capped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brace_cuts_at_opening_brace() {
        assert_eq!(
            brace_signature("fn add(a: i32, b: i32) -> i32 {\n    a + b\n}"),
            "fn add(a: i32, b: i32) -> i32"
        );
    }

    #[test]
    fn brace_cuts_at_newline_without_brace() {
        assert_eq!(
            brace_signature("type Pair = (u32,\n    u32);"),
            "type Pair = (u32,"
        );
    }

    #[test]
    fn brace_whole_text_when_single_line() {
        assert_eq!(brace_signature("const MAX: usize = 8;"), "const MAX: usize = 8;");
    }

    #[test]
    fn colon_cuts_after_params() {
        assert_eq!(
            colon_signature("def f(a, b):\n    return a"),
            "def f(a, b):"
        );
    }

    #[test]
    fn colon_handles_annotations_inside_params() {
        // The ':' inside the parameter list must not terminate the head.
        assert_eq!(
            colon_signature("def f(a: int, b: dict[str, int]) -> int:\n    ..."),
            "def f(a: int, b: dict[str, int]) -> int:"
        );
    }

    #[test]
    fn colon_collapses_multiline_heads() {
        assert_eq!(
            colon_signature("def f(\n    a,\n    b,\n):\n    pass"),
            "def f( a, b, ):"
        );
    }

    #[test]
    fn colon_class_without_params() {
        assert_eq!(colon_signature("class Foo:\n    pass"), "class Foo:");
    }

    #[test]
    fn long_heads_truncate_with_ellipsis() {
        let long = format!("fn f({})", "x: u64, ".repeat(60));
        let sig = brace_signature(&long);
        assert_eq!(sig.chars().count(), 201);
        assert!(sig.ends_with('…'));
    }
}
