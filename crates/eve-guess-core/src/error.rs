//! Error types for eve-guess.
//!
//! Resolution only ever fails on invalid input; everything that goes wrong
//! while talking to ESI or the snapshot directory is mapped to one of these
//! variants and then contained by the refresher or the published filter.

use crate::models::Category;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the eve-guess library.
#[derive(Debug, Error)]
pub enum GuessError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Upstream returned {status} for {url}")]
    Upstream { url: String, status: u16 },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Cached snapshot at {path} is corrupt: {message}")]
    CacheCorruption { path: PathBuf, message: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Catalog errors
    #[error("Universe data incomplete, unable to create new cache (empty: {})", join_categories(.categories))]
    RefreshIncomplete { categories: Vec<Category> },

    #[error("Catalog for {0} has not been loaded yet")]
    CatalogNotLoaded(Category),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for eve-guess operations.
pub type Result<T> = std::result::Result<T, GuessError>;

fn join_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<std::io::Error> for GuessError {
    fn from(err: std::io::Error) -> Self {
        GuessError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for GuessError {
    fn from(err: serde_json::Error) -> Self {
        GuessError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for GuessError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GuessError::Timeout(std::time::Duration::from_secs(0))
        } else if let Some(status) = err.status() {
            GuessError::Upstream {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                status: status.as_u16(),
            }
        } else {
            GuessError::Network {
                message: err.to_string(),
                source: Some(err),
            }
        }
    }
}

impl GuessError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        GuessError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Shorthand for a validation failure on the `q` parameter.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        GuessError::Validation {
            field: "query".to_string(),
            message: message.into(),
        }
    }

    /// HTTP status code the request layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            GuessError::Validation { .. } | GuessError::UnknownCategory(_) => 400,
            GuessError::CatalogNotLoaded(_) => 503,
            GuessError::Network { .. }
            | GuessError::Timeout(_)
            | GuessError::Upstream { .. } => 502,
            _ => 500,
        }
    }

    /// Check if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            GuessError::Network { .. } | GuessError::Timeout(_) => true,
            // 4xx answers will not change on a second attempt, 420 is ESI's error limit
            GuessError::Upstream { status, .. } => *status >= 500 || *status == 420,
            _ => false,
        }
    }
}
