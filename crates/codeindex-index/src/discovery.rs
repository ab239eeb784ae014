//! Candidate-file discovery under a project root.

use std::path::Path;
use std::time::UNIX_EPOCH;

use ignore::WalkBuilder;

use codeindex_core::IndexError;

/// Walk the tree and collect relative paths of supported source files,
/// sorted for deterministic downstream behavior.
pub fn discover_files(
    root: &Path,
    ignores: &[String],
    extensions: &[&str],
) -> Result<Vec<String>, IndexError> {
    if !root.is_dir() {
        return Err(IndexError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("project root not found: {}", root.display()),
        )));
    }

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false)
        .follow_links(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("walk error: {err}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();

        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !extensions.contains(&extension) {
            continue;
        }

        let rel = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        if ignores.iter().any(|pattern| matches_ignore(&rel, pattern)) {
            continue;
        }

        files.push(rel);
    }

    files.sort_unstable();
    Ok(files)
}

/// A pattern matches at segment boundaries: the whole path, a leading
/// prefix, or any interior segment run (`target/debug` matches
/// `target/debug/...` and `pkg/target/debug/...`).
fn matches_ignore(rel: &str, pattern: &str) -> bool {
    let pat = pattern.trim_matches('/');
    if pat.is_empty() {
        return false;
    }
    rel == pat
        || rel.starts_with(&format!("{pat}/"))
        || rel.contains(&format!("/{pat}/"))
        || rel.ends_with(&format!("/{pat}"))
}

/// Modification time in epoch milliseconds; `None` when the file vanished
/// or the platform clock is unusable.
pub fn mtime_millis(path: &Path) -> Option<u64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let elapsed = modified.duration_since(UNIX_EPOCH).ok()?;
    Some(elapsed.as_millis() as u64)
}
