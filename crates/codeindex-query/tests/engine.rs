//! End-to-end operator tests over a real temporary source tree.

use std::fs;
use std::path::PathBuf;

use codeindex_query::{
    callers, context, dependencies, dependents, diff, map, neighborhood, orphans, outline,
    render_map_text, search, symbols, trace, CallersParams, CodeIndex, ContextParams, DiffParams,
    MapParams, NeighborhoodParams, OrphanLevel, OrphanParams, OutlineParams, Page, SearchParams,
    SymbolsParams, TraceParams,
};

struct Project {
    root: PathBuf,
}

impl Project {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("codeindex_engine_{name}"));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        let project = Self { root };
        project.write(
            "src/core.rs",
            r#"pub struct Config {
    pub depth: usize,
    pub verbose: bool,
}

pub fn parse_config(raw: &str) -> Config {
    let depth = raw.len();
    Config { depth, verbose: false }
}
"#,
        );
        project.write(
            "src/app.rs",
            r#"pub fn run_app(raw: &str) -> usize {
    let config = parse_config(raw);
    config.depth
}
"#,
        );
        project.write(
            "src/util.rs",
            r#"pub fn helper_fn(input: usize) -> usize {
    input * 2
}
"#,
        );
        project.write(
            "lib/tools.py",
            "def summarize(raw):\n    config = parse_config(raw)\n    return config\n",
        );
        project
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn index(&self) -> CodeIndex {
        CodeIndex::with_cache_file(&self.root, self.root.join(".engine-cache.json"))
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

#[test]
fn map_lists_ranked_symbols_grouped_by_file() {
    let project = Project::new("map");
    let mut index = project.index();

    let result = map(&mut index, MapParams::default()).unwrap();
    assert_eq!(result.total_files, 4);
    assert!(result.total_symbols >= 5);
    assert_eq!(result.shown_symbols, result.total_symbols);

    // parse_config is imported from two files; it should lead its file group
    // and its file group should lead the map.
    let first = &result.files[0];
    assert_eq!(first.file, "src/core.rs");

    let text = render_map_text(&result);
    assert!(text.contains("src/core.rs"));
    assert!(text.contains("│ pub fn parse_config(raw: &str) -> Config"));
}

#[test]
fn map_count_mode_returns_totals_only() {
    let project = Project::new("map_count");
    let mut index = project.index();

    let result = map(
        &mut index,
        MapParams {
            page: Page { count: true, ..Default::default() },
            ..Default::default()
        },
    )
    .unwrap();
    assert!(result.files.is_empty());
    assert!(result.total_symbols > 0);
}

#[test]
fn map_pagination_applies_after_ranking() {
    let project = Project::new("map_page");
    let mut index = project.index();

    let all = map(&mut index, MapParams::default()).unwrap();
    let paged = map(
        &mut index,
        MapParams {
            page: Page { offset: 1, limit: Some(2), count: false },
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(paged.shown_symbols, 2);
    assert_eq!(paged.total_symbols, all.total_symbols);
}

#[test]
fn search_matches_names_and_signatures() {
    let project = Project::new("search");
    let mut index = project.index();

    let result = search(
        &mut index,
        SearchParams { query: "parse".to_string(), ..Default::default() },
    )
    .unwrap();
    assert!(result.symbols.iter().any(|s| s.name == "parse_config"));

    // Case-insensitive; signature text matches too.
    let result = search(
        &mut index,
        SearchParams { query: "-> CONFIG".to_string(), ..Default::default() },
    )
    .unwrap();
    assert!(result.symbols.iter().any(|s| s.name == "parse_config"));

    let result = search(
        &mut index,
        SearchParams { query: "zzz_nothing".to_string(), ..Default::default() },
    )
    .unwrap();
    assert!(result.symbols.is_empty());
    assert_eq!(result.total, 0);
}

#[test]
fn symbols_filters_by_file_and_reports_unknowns() {
    let project = Project::new("symbols");
    let mut index = project.index();

    let result = symbols(
        &mut index,
        SymbolsParams { file: Some("src/core.rs".to_string()), ..Default::default() },
    )
    .unwrap();
    assert!(result.symbols.iter().all(|s| s.file == "src/core.rs"));
    assert!(result.symbols.iter().any(|s| s.name == "Config"));

    let missing = symbols(
        &mut index,
        SymbolsParams { file: Some("lib/core.rs".to_string()), ..Default::default() },
    )
    .unwrap();
    assert!(missing.file_not_found);
    assert!(missing.suggestions.contains(&"src/core.rs".to_string()));
}

#[test]
fn callers_crosses_files_and_languages() {
    let project = Project::new("callers");
    let mut index = project.index();

    let result = callers(
        &mut index,
        CallersParams { symbol: "parse_config".to_string(), ..Default::default() },
    )
    .unwrap();
    let files: Vec<&str> = result.callers.iter().map(|c| c.file.as_str()).collect();
    assert!(files.contains(&"src/app.rs"));
    assert!(files.contains(&"lib/tools.py"));

    let unknown = callers(
        &mut index,
        CallersParams { symbol: "parse_conf".to_string(), ..Default::default() },
    )
    .unwrap();
    assert!(unknown.callers.is_empty());
    assert!(unknown.suggestions.contains(&"parse_config".to_string()));
}

#[test]
fn callers_context_excerpts_call_sites() {
    let project = Project::new("callers_ctx");
    let mut index = project.index();

    let result = callers(
        &mut index,
        CallersParams {
            symbol: "parse_config".to_string(),
            context: 1,
            ..Default::default()
        },
    )
    .unwrap();
    let app = result
        .callers
        .iter()
        .find(|c| c.file == "src/app.rs")
        .unwrap();
    assert_eq!(app.sites.len(), 1);
    assert_eq!(app.sites[0].line, 2);
    assert!(app.sites[0]
        .excerpt
        .iter()
        .any(|l| l.contains("parse_config(raw)")));
}

#[test]
fn dependencies_and_dependents_follow_imports() {
    let project = Project::new("deps");
    let mut index = project.index();

    let deps = dependencies(&mut index, "src/app.rs", Page::default()).unwrap();
    assert_eq!(deps.files.len(), 1);
    assert_eq!(deps.files[0].file, "src/core.rs");

    let dependents_of_core = dependents(&mut index, "src/core.rs", Page::default()).unwrap();
    let files: Vec<&str> = dependents_of_core.files.iter().map(|f| f.file.as_str()).collect();
    assert!(files.contains(&"src/app.rs"));
    assert!(files.contains(&"lib/tools.py"));

    let missing = dependencies(&mut index, "app.rs", Page::default()).unwrap();
    assert!(missing.file_not_found);
    assert_eq!(missing.suggestions, vec!["src/app.rs"]);
}

#[test]
fn neighborhood_keeps_direct_files_and_counts() {
    let project = Project::new("hood");
    let mut index = project.index();

    let result = neighborhood(
        &mut index,
        NeighborhoodParams { file: "src/app.rs".to_string(), ..Default::default() },
    )
    .unwrap();
    let files: Vec<&str> = result.files.iter().map(|f| f.file.as_str()).collect();
    assert!(files.contains(&"src/app.rs"));
    assert!(files.contains(&"src/core.rs"));
    assert!(result.files.iter().all(|f| f.direct));
    assert!(result
        .edges
        .contains(&("src/app.rs".to_string(), "src/core.rs".to_string())));
    assert!(result.symbols.iter().any(|s| s.name == "parse_config"));

    let counts = neighborhood(
        &mut index,
        NeighborhoodParams {
            file: "src/app.rs".to_string(),
            count: true,
            ..Default::default()
        },
    )
    .unwrap();
    let counts = counts.counts.unwrap();
    assert_eq!(counts.total_files, 2);
    assert_eq!(counts.total_visited, 2);
    assert_eq!(counts.total_edges, 1);
}

#[test]
fn orphan_files_have_no_import_edges() {
    let project = Project::new("orphan_files");
    let mut index = project.index();

    let result = orphans(
        &mut index,
        OrphanParams { level: OrphanLevel::File, kind: None, page: Page::default() },
    )
    .unwrap();
    let files: Vec<&str> = result.files.iter().map(|f| f.file.as_str()).collect();
    assert!(files.contains(&"src/util.rs"));
    assert!(!files.contains(&"src/app.rs"));
    assert!(!files.contains(&"src/core.rs"));
}

#[test]
fn orphan_symbols_lack_external_references() {
    let project = Project::new("orphan_symbols");
    let mut index = project.index();

    let result = orphans(
        &mut index,
        OrphanParams { level: OrphanLevel::Symbol, kind: None, page: Page::default() },
    )
    .unwrap();
    let names: Vec<&str> = result.symbols.iter().map(|s| s.name.as_str()).collect();
    assert!(names.contains(&"helper_fn"));
    assert!(!names.contains(&"parse_config"));
}

#[test]
fn context_reports_used_symbols_previews_and_callers() {
    let project = Project::new("context");
    let mut index = project.index();

    let result = context(
        &mut index,
        ContextParams { symbol: "parse_config".to_string(), file: None },
    )
    .unwrap();
    let target = result.target.unwrap();
    assert_eq!(target.file, "src/core.rs");

    assert!(result.used.iter().any(|u| u.name == "Config"));

    // `Config` appears capitalized in the signature and is a known class.
    let preview = result
        .type_previews
        .iter()
        .find(|p| p.name == "Config")
        .expect("expected a Config preview");
    assert!(preview.preview[0].contains("pub struct Config"));
    assert!(!preview.truncated);

    assert_eq!(result.callers, vec!["lib/tools.py", "src/app.rs"]);
}

#[test]
fn context_unknown_symbol_suggests_names() {
    let project = Project::new("context_unknown");
    let mut index = project.index();

    let result = context(
        &mut index,
        ContextParams { symbol: "rse_config".to_string(), file: None },
    )
    .unwrap();
    assert!(result.target.is_none());
    assert!(result.suggestions.contains(&"parse_config".to_string()));
}

#[test]
fn trace_walks_up_to_containing_definitions() {
    let project = Project::new("trace");
    let mut index = project.index();

    let result = trace(
        &mut index,
        TraceParams { symbol: "parse_config".to_string(), ..Default::default() },
    )
    .unwrap();
    assert_eq!(result.roots.len(), 1);
    let root = &result.roots[0];
    assert_eq!(root.name, "parse_config");

    let child_names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert!(child_names.contains(&"run_app"));
    assert!(child_names.contains(&"summarize"));
}

#[test]
fn outline_collapses_leaf_bodies() {
    let project = Project::new("outline");
    let mut index = project.index();

    let result = outline(
        &mut index,
        OutlineParams { file: "src/core.rs".to_string(), ..Default::default() },
    )
    .unwrap();
    assert!(result.text.contains("pub struct Config"));
    assert!(result.text.contains("... (3 lines)"));
    // Collapsed bodies are gone from the text.
    assert!(!result.text.contains("raw.len()"));
}

#[test]
fn outline_expands_named_symbols_in_full() {
    let project = Project::new("outline_expand");
    let mut index = project.index();

    let result = outline(
        &mut index,
        OutlineParams {
            file: "src/core.rs".to_string(),
            expand_symbols: vec!["parse_config".to_string()],
            ..Default::default()
        },
    )
    .unwrap();
    assert!(result.text.contains("raw.len()"));

    let missed = outline(
        &mut index,
        OutlineParams {
            file: "src/core.rs".to_string(),
            expand_symbols: vec!["parse_c".to_string()],
            ..Default::default()
        },
    )
    .unwrap();
    assert!(missed.text.is_empty());
    assert!(missed.suggestions.contains(&"parse_config".to_string()));
}

#[test]
fn diff_outside_a_repository_reports_vcs_error() {
    let project = Project::new("diff_norepo");
    let mut index = project.index();

    let result = diff(&mut index, DiffParams::default()).unwrap();
    assert!(result.changed.is_empty());
    assert!(result.vcs_error.is_some());
}

#[test]
fn edits_are_picked_up_between_queries() {
    let project = Project::new("incremental");
    let mut index = project.index();

    let before = map(&mut index, MapParams::default()).unwrap();
    assert!(!before
        .files
        .iter()
        .any(|f| f.symbols.iter().any(|s| s.name == "extra_fn")));

    std::thread::sleep(std::time::Duration::from_millis(20));
    project.write("src/util.rs", "pub fn extra_fn() {}\n");

    let after = map(&mut index, MapParams::default()).unwrap();
    assert!(after
        .files
        .iter()
        .any(|f| f.symbols.iter().any(|s| s.name == "extra_fn")));
    assert!(!after
        .files
        .iter()
        .any(|f| f.symbols.iter().any(|s| s.name == "helper_fn")));
}

#[test]
fn stats_summarize_the_graph() {
    let project = Project::new("stats");
    let mut index = project.index();

    let stats = index.stats().unwrap();
    assert_eq!(stats.files, 4);
    assert!(stats.symbols >= 5);
    assert!(stats.edges > 0);
    assert_eq!(stats.scanned, 4);
}
