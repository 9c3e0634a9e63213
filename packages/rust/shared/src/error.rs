//! Error types for Blogsmith.
//!
//! Library crates use [`BlogsmithError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Blogsmith operations.
#[derive(Debug, thiserror::Error)]
pub enum BlogsmithError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to an external service.
    #[error("network error: {0}")]
    Network(String),

    /// Reference lookup or web search returned an unusable response.
    #[error("{service} error: {message}")]
    Search {
        service: &'static str,
        message: String,
    },

    /// The language-model service rejected the request.
    #[error("language model returned HTTP {status}: {body}")]
    Llm { status: u16, body: String },

    /// The language-model service answered without any message content.
    #[error("language model returned an empty response")]
    EmptyResponse,

    /// A stage tried to read a field no earlier stage has produced.
    #[error("stage `{stage}` requires `{field}`, which has not been produced yet")]
    MissingField {
        stage: &'static str,
        field: &'static str,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid input (empty topic, malformed value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BlogsmithError>;

impl BlogsmithError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a search error attributed to the named service.
    pub fn search(service: &'static str, msg: impl Into<String>) -> Self {
        Self::Search {
            service,
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
