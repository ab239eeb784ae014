//! False-positive tables for orphan detection.
//!
//! Entry points, framework callbacks, config files, and test scaffolding all
//! look unreferenced to the graph while being perfectly alive. These fixed
//! tables keep them out of orphan reports.

/// File stems that are entry points or tool conventions, never orphans.
const ORPHAN_FILE_STEMS: &[&str] = &[
    "index", "main", "app", "server", "cli", "mod", "lib", "manage", "wsgi", "asgi", "handler",
    "lambda", "__init__", "__main__", "config", "settings", "conf", "conftest", "setup",
    "gulpfile", "gruntfile", "makefile", "rakefile", "taskfile",
];

/// Symbol names invoked by frameworks or runtimes rather than by code.
const ORPHAN_SYMBOL_NAMES: &[&str] = &[
    "main", "run", "start", "serve", "handler", "execute", "app", "setup", "teardown", "setUp",
    "tearDown", "beforeAll", "afterAll", "beforeEach", "afterEach", "before", "after",
    "constructor", "init", "initialize", "configure", "register", "middleware", "plugin",
    "default", "module", "exports",
];

/// Directory segments that mark test trees.
pub const TEST_DIR_SEGMENTS: &[&str] = &["test", "tests", "__tests__", "spec", "specs"];

/// Whether a file path should be excluded from file-level orphan reports.
pub fn is_orphan_file_false_positive(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);

    // Dotfiles and TS declaration files
    if file_name.starts_with('.') || path.ends_with(".d.ts") {
        return true;
    }

    let stem = file_name.split('.').next().unwrap_or(file_name);
    let stem_lower = stem.to_lowercase();
    if ORPHAN_FILE_STEMS.iter().any(|s| *s == stem_lower) {
        return true;
    }

    // `*.config` stems and `*.rc` stems
    let full_stem = file_name
        .rsplit_once('.')
        .map(|(s, _)| s)
        .unwrap_or(file_name);
    if full_stem.ends_with(".config") {
        return true;
    }
    if full_stem.ends_with(".rc") {
        return true;
    }

    // Test directories and test-file naming conventions
    if path
        .split('/')
        .any(|segment| TEST_DIR_SEGMENTS.contains(&segment))
    {
        return true;
    }
    if stem.starts_with("test_") || file_name.starts_with("test.") {
        return true;
    }
    if full_stem.ends_with(".test")
        || full_stem.ends_with(".spec")
        || full_stem.ends_with("_test")
        || full_stem.ends_with("_spec")
    {
        return true;
    }

    false
}

/// Whether a symbol should be excluded from symbol-level orphan reports.
///
/// `file` is the symbol's owning path; the signature feeds the method
/// heuristic (methods are invoked through receivers the reference extractor
/// deliberately ignores, so they always look orphaned).
pub fn is_orphan_symbol_false_positive(name: &str, file: &str, signature: &str) -> bool {
    if name.len() <= 2 {
        return true;
    }
    if ORPHAN_SYMBOL_NAMES.iter().any(|s| *s == name) {
        return true;
    }
    if name.starts_with("__") && name.ends_with("__") {
        return true;
    }

    // Symbol named after its file (module-pattern exports)
    let file_name = file.rsplit('/').next().unwrap_or(file);
    let stem = file_name.split('.').next().unwrap_or(file_name);
    if name.eq_ignore_ascii_case(stem) {
        return true;
    }

    looks_like_method(signature)
}

/// Heuristic: does this signature belong to a method?
///
/// Indentation languages: `self`/`cls` as the first parameter. Brace
/// languages: a parameter list with none of the free-function keywords.
fn looks_like_method(signature: &str) -> bool {
    if let Some(paren) = signature.find('(') {
        let params = signature[paren + 1..].trim_start();
        if params.starts_with("self") || params.starts_with("cls") {
            let rest = &params[if params.starts_with("self") { 4 } else { 3 }..];
            if rest.is_empty() || rest.starts_with(',') || rest.starts_with(')') || rest.starts_with(':') {
                return true;
            }
        }
        let head = &signature[..paren];
        const NON_METHOD_MARKERS: &[&str] = &[
            "function", "fn ", "def ", "func ", "fun ", "macro", "struct ", "class ", "enum ",
            "interface ", "trait ", "type ",
        ];
        if !NON_METHOD_MARKERS.iter().any(|m| head.contains(m)) {
            return true;
        }
    }
    false
}
