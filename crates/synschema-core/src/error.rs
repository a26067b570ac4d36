//! # Error Hierarchy
//!
//! Structured error types shared by the governance crates, built with
//! `thiserror`. Each variant carries the path or value that caused it so an
//! operator can act on the message alone.

use thiserror::Error;

/// Top-level error for file-backed governance operations.
#[derive(Error, Debug)]
pub enum GovernanceError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A file did not contain well-formed JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// The offending file.
        path: String,
        /// Parser error with line/column.
        #[source]
        source: serde_json::Error,
    },

    /// Serialising a value for output failed.
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Run configuration could not be established.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors while building a [`GovernanceConfig`](crate::GovernanceConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The schema version token is unusable as a URL path segment.
    #[error("invalid schema version {0:?}: must be non-empty with no '/' or whitespace")]
    InvalidVersion(String),

    /// `version.json` exists but could not be used.
    #[error("malformed version file {path}: {reason}")]
    MalformedVersionFile {
        /// Path to the version file.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The canonical base URL is not an absolute http(s) URL.
    #[error("invalid base URL {0:?}: expected an absolute http(s) URL")]
    InvalidBaseUrl(String),
}
