//! code-index: structural code queries from the command line.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use codeindex_core::SymbolKind;
use codeindex_query::{
    callers, context, dependencies, dependents, diff, history, map, neighborhood, orphans,
    outline, render_map_text, search, symbols, trace, CallersParams, CodeIndex, ContextParams,
    DiffParams, FileListResult, HistoryParams, MapParams, NeighborhoodParams, OrphanLevel,
    OrphanParams, OutlineParams, Page, SearchParams, SymbolsParams, SymbolsResult, TraceNode,
    TraceParams,
};

#[derive(Parser)]
#[command(name = "code-index", about = "Structural code indexing and queries")]
#[command(version, propagate_version = true)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Print result counts only
    #[arg(long, global = true)]
    count: bool,

    /// Skip this many results
    #[arg(long, global = true, default_value_t = 0)]
    offset: usize,

    /// Cap the number of results
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ranked overview of the repository's symbols
    Map {
        /// Boost these files' neighborhoods in the ranking
        #[arg(long = "focus", value_name = "FILE")]
        focus: Vec<String>,
    },

    /// Case-insensitive search over names and signatures
    Search {
        query: String,
        /// Filter by kind (function, class, type, variable, namespace, other)
        #[arg(long)]
        kind: Option<String>,
    },

    /// List symbol nodes
    Symbols {
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        kind: Option<String>,
    },

    /// Files referencing a symbol
    Callers {
        symbol: String,
        /// Narrow to the definition in this file
        #[arg(long)]
        file: Option<String>,
        /// Show call sites with this many context lines
        #[arg(long, default_value_t = 0)]
        context: usize,
    },

    /// Files a file imports
    Deps { file: String },

    /// Files importing a file
    Dependents { file: String },

    /// The local import neighborhood of a file
    Neighborhood {
        file: String,
        #[arg(long, default_value_t = 2)]
        hops: usize,
        #[arg(long, default_value_t = 15)]
        max_files: usize,
        /// Skip the backward hop over direct dependents
        #[arg(long)]
        no_dependents: bool,
    },

    /// Files nobody imports, or symbols nobody references externally
    Orphans {
        /// `file` or `symbol`
        #[arg(long, default_value = "file")]
        level: String,
        #[arg(long)]
        kind: Option<String>,
    },

    /// Symbols of one file, map-style
    Structure { file: String },

    /// Full context of one symbol: used symbols, type previews, callers
    Context {
        symbol: String,
        #[arg(long)]
        file: Option<String>,
    },

    /// Walk the call graph upward from a symbol
    Trace {
        symbol: String,
        #[arg(long)]
        file: Option<String>,
        #[arg(long, default_value_t = 3)]
        depth: usize,
    },

    /// Definition changes versus a git ref
    Diff {
        #[arg(default_value = "HEAD")]
        r#ref: String,
    },

    /// Commit history of one symbol's line range
    History {
        symbol: String,
        #[arg(long)]
        file: Option<String>,
        #[arg(short = 'n', long = "max-count", default_value_t = 10)]
        n: usize,
        #[arg(long, default_value_t = 0)]
        skip: usize,
    },

    /// File skeleton with collapsed bodies
    Outline {
        file: String,
        /// Print these symbols in full instead
        #[arg(long = "expand", value_name = "SYMBOL")]
        expand: Vec<String>,
        /// Annotate collapsed bodies with caller counts
        #[arg(long)]
        callers: bool,
    },

    /// Drop all caches and rebuild the index
    Reindex,

    /// Index statistics
    Stats,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let page = Page {
        offset: cli.offset,
        limit: cli.limit,
        count: cli.count,
    };
    let json = cli.json;
    let mut index = CodeIndex::new(root);

    match cli.command {
        Commands::Map { focus } => {
            let result = map(&mut index, MapParams { focus_files: focus, page })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if page.count {
                println!("{} symbols in {} files", result.total_symbols, result.total_files);
            } else {
                print!("{}", render_map_text(&result));
            }
        }
        Commands::Search { query, kind } => {
            let kind = parse_kind(kind)?;
            let result = search(&mut index, SearchParams { query, kind, page })?;
            print_symbols(&result, page, json)?;
        }
        Commands::Symbols { file, kind } => {
            let kind = parse_kind(kind)?;
            let result = symbols(&mut index, SymbolsParams { file, kind, page })?;
            print_symbols(&result, page, json)?;
        }
        Commands::Structure { file } => {
            let result = symbols(
                &mut index,
                SymbolsParams { file: Some(file), kind: None, page },
            )?;
            print_symbols(&result, page, json)?;
        }
        Commands::Callers { symbol, file, context } => {
            let result = callers(&mut index, CallersParams { symbol, file, context, page })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if page.count {
                println!("{}", result.total);
            } else if result.callers.is_empty() {
                print_empty_with_suggestions("no callers found", &result.suggestions);
            } else {
                for caller in &result.callers {
                    println!("{}", caller.file);
                    for site in &caller.sites {
                        println!("  line {}:", site.line);
                        for line in &site.excerpt {
                            println!("    {line}");
                        }
                    }
                }
            }
        }
        Commands::Deps { file } => {
            let result = dependencies(&mut index, &file, page)?;
            print_files(&result, page, json)?;
        }
        Commands::Dependents { file } => {
            let result = dependents(&mut index, &file, page)?;
            print_files(&result, page, json)?;
        }
        Commands::Neighborhood { file, hops, max_files, no_dependents } => {
            let result = neighborhood(
                &mut index,
                NeighborhoodParams {
                    file,
                    hops,
                    include_dependents: !no_dependents,
                    max_files,
                    count: page.count,
                },
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if result.file_not_found {
                print_empty_with_suggestions("file not found", &result.suggestions);
            } else if let Some(counts) = &result.counts {
                println!(
                    "{} files, {} symbols, {} edges ({} visited)",
                    counts.total_files, counts.total_symbols, counts.total_edges, counts.total_visited
                );
            } else {
                for entry in &result.files {
                    let marker = if entry.direct { "*" } else { " " };
                    println!("{marker} {} (hops {})", entry.file, entry.hops);
                }
                for symbol in &result.symbols {
                    println!("  {:>4}│ {}", symbol.line_start, symbol.signature);
                }
            }
        }
        Commands::Orphans { level, kind } => {
            let level = OrphanLevel::from_str(&level)?;
            let kind = parse_kind(kind)?;
            let result = orphans(&mut index, OrphanParams { level, kind, page })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if page.count {
                println!("{}", result.total);
            } else {
                for file in &result.files {
                    println!("{} ({} symbols)", file.file, file.symbol_count);
                }
                for symbol in &result.symbols {
                    println!("{}:{} {}", symbol.file, symbol.line_start, symbol.signature);
                }
            }
        }
        Commands::Context { symbol, file } => {
            let result = context(&mut index, ContextParams { symbol, file })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if let Some(target) = &result.target {
                println!("{}:{} {}", target.file, target.line_start, target.signature);
                if !result.used.is_empty() {
                    println!("\nuses:");
                    for used in &result.used {
                        println!("  {}:{} {}", used.file, used.line_start, used.signature);
                    }
                }
                for preview in &result.type_previews {
                    println!("\n{} ({}):", preview.name, preview.file);
                    for line in &preview.preview {
                        println!("  {line}");
                    }
                    if preview.truncated {
                        println!("  ...");
                    }
                }
                if !result.callers.is_empty() {
                    println!("\ncalled from:");
                    for caller in &result.callers {
                        println!("  {caller}");
                    }
                }
            } else {
                print_empty_with_suggestions("symbol not found", &result.suggestions);
            }
        }
        Commands::Trace { symbol, file, depth } => {
            let result = trace(&mut index, TraceParams { symbol, file, depth })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if result.roots.is_empty() {
                print_empty_with_suggestions("symbol not found", &result.suggestions);
            } else {
                for root in &result.roots {
                    print_trace(root, 0);
                }
            }
        }
        Commands::Diff { r#ref } => {
            let result = diff(&mut index, DiffParams { reference: r#ref })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if let Some(err) = &result.vcs_error {
                println!("version control unavailable: {err}");
            } else if result.changed.is_empty() {
                println!("no definition changes");
            } else {
                for change in &result.changed {
                    println!("{} ({} callers)", change.file, change.callers);
                    for name in &change.added {
                        println!("  + {name}");
                    }
                    for name in &change.removed {
                        println!("  - {name}");
                    }
                    for name in &change.modified {
                        println!("  ~ {name}");
                    }
                }
                println!("{} total callers affected", result.total_callers);
            }
        }
        Commands::History { symbol, file, n, skip } => {
            let result = history(
                &mut index,
                HistoryParams { symbol, file, limit: n, skip },
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if let Some(err) = &result.vcs_error {
                println!("version control unavailable: {err}");
            } else if result.target.is_none() {
                print_empty_with_suggestions("symbol not found", &result.suggestions);
            } else {
                for entry in &result.entries {
                    println!(
                        "{} {} {} {}",
                        &entry.hash[..entry.hash.len().min(10)],
                        entry.date,
                        entry.author,
                        entry.subject
                    );
                }
            }
        }
        Commands::Outline { file, expand, callers } => {
            let result = outline(
                &mut index,
                OutlineParams { file, expand_symbols: expand, caller_counts: callers },
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if result.file_not_found {
                print_empty_with_suggestions("file not found", &result.suggestions);
            } else if result.text.is_empty() {
                print_empty_with_suggestions("no matching symbols", &result.suggestions);
            } else {
                print!("{}", result.text);
            }
        }
        Commands::Reindex => {
            let report = index.reindex()?;
            println!(
                "reindexed: {} files parsed, {} scanned",
                report.changed, report.scanned
            );
        }
        Commands::Stats => {
            let stats = index.stats()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("files:   {}", stats.files);
                println!("symbols: {}", stats.symbols);
                println!("edges:   {}", stats.edges);
                println!("scanned: {}", stats.scanned);
                println!("cache:   {}", stats.cache_path);
            }
        }
    }

    Ok(())
}

fn parse_kind(kind: Option<String>) -> anyhow::Result<Option<SymbolKind>> {
    kind.map(|k| SymbolKind::from_str(&k)).transpose().map_err(Into::into)
}

fn print_symbols(result: &SymbolsResult, page: Page, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    if result.file_not_found {
        print_empty_with_suggestions("file not found", &result.suggestions);
        return Ok(());
    }
    if page.count {
        println!("{}", result.total);
        return Ok(());
    }
    for hit in &result.symbols {
        println!("{}:{} {}", hit.file, hit.line_start, hit.signature);
    }
    Ok(())
}

fn print_files(result: &FileListResult, page: Page, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    if result.file_not_found {
        print_empty_with_suggestions("file not found", &result.suggestions);
        return Ok(());
    }
    if page.count {
        println!("{}", result.total);
        return Ok(());
    }
    for entry in &result.files {
        println!("{} ({} symbols)", entry.file, entry.symbol_count);
    }
    Ok(())
}

fn print_empty_with_suggestions(message: &str, suggestions: &[String]) {
    println!("{message}");
    if !suggestions.is_empty() {
        println!("did you mean:");
        for suggestion in suggestions {
            println!("  {suggestion}");
        }
    }
}

fn print_trace(node: &TraceNode, depth: usize) {
    println!(
        "{}{} ({}:{})",
        "  ".repeat(depth),
        node.name,
        node.file,
        node.line
    );
    for child in &node.children {
        print_trace(child, depth + 1);
    }
}
