/// Unified error type for code-index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Corrupt cache: {0}")]
    CacheCorrupt(String),

    #[error("File not in index: {0}")]
    FileNotFound(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Version control error: {0}")]
    Vcs(String),

    #[error("Usage error: {0}")]
    Usage(String),
}
