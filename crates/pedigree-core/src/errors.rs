//! Error types for the pedigree core library.

/// Top-level error enum for the pedigree core library.
///
/// Per-node resolution failures never surface through this type: the tree
/// builder and the scraper degrade them to "unknown ancestor" and, for the
/// scraper, accumulate them as [`crate::models::ImportWarning`]s. Only the
/// request boundary (validation, fetch, storage) produces hard errors.
#[derive(Debug, thiserror::Error)]
pub enum PedigreeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure fetching a remote document or relayed image.
///
/// The variants are deliberately distinguishable so a caller can decide
/// whether to suggest an alternate path (e.g. "paste the HTML instead"):
/// blocked-before-network, timeout, upstream status, and transport errors
/// are all separate cases. `InvalidUrl`, `BlockedScheme`, and `BlockedHost`
/// are raised before any network call is made.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("URL could not be parsed: {0}")]
    InvalidUrl(String),

    #[error("Scheme not allowed (https only): {0}")]
    BlockedScheme(String),

    #[error("Host not on the allow-list: {0}")]
    BlockedHost(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("Network error: {0}")]
    Network(String),
}

pub type PedigreeResult<T> = Result<T, PedigreeError>;
