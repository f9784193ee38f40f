//! Typed errors for the competitor watch library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can abort a competitor check or a store operation.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Fetching the competitor page failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No competitor registered under this id
    #[error("competitor not found: {id}")]
    CompetitorNotFound { id: i64 },

    /// Competitor URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Request exceeded the fetch timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors from the classification backend.
///
/// These never leave the classifier; they are folded into an
/// `error` summary instead.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// No backend credential configured
    #[error("classification backend not configured")]
    NotConfigured,

    /// Backend call failed (network, auth, rate limit)
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Backend did not answer in time
    #[error("backend timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Backend answered with something that is not the expected JSON object
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type alias for watch operations.
pub type WatchResult<T> = std::result::Result<T, WatchError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for classification backend calls.
pub type ClassifyResult<T> = std::result::Result<T, ClassifyError>;
