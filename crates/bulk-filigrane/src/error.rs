//! Error types for the watermarking pipeline
//!
//! The first four variants are the job failure taxonomy. Their `Display` output is the exact
//! message recorded in a [`JobOutcome`](crate::types::JobOutcome), so the scheduler can turn
//! any of them into an outcome with `to_string()`.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Submitting files to the remote service failed
    #[error("upload failed: {0}")]
    Upload(String),

    /// The poll budget was exhausted before the document was ready
    #[error("timeout")]
    PollTimeout,

    /// Fetching or saving the processed document failed. The cause is only kept for logs.
    #[error("download failed")]
    Download(String),

    /// A job escaped its own failure handling (panic or aborted task)
    #[error("error: {0}")]
    Worker(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File extension outside the supported media kinds
    #[error("Unsupported media kind: {0}")]
    UnsupportedMediaKind(String),

    /// A job was built without input files
    #[error("A job needs at least one input file")]
    EmptyJob,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create an upload error
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload(message.into())
    }

    /// Create a download error
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download(message.into())
    }

    /// Create a worker error
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
