//! Error types for the CORS stub header rewriter
//!
//! This module provides the error hierarchy using `thiserror`. Rewrite
//! failures never leave the rewriter: they are logged and turned into a
//! pass-through. Only configuration and parameter parsing surface errors
//! to the host.

use thiserror::Error;

/// The main error type for crate operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Internal failure while computing response headers.
///
/// Raised when a computed header cannot form a legal HTTP header. Callers of
/// the transformer never see it; it is reported and the draft response is
/// passed through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// Header name is not a valid HTTP token
    #[error("Invalid header name '{name}': {reason}")]
    InvalidHeaderName {
        /// Offending header name
        name: String,
        /// Underlying parse failure
        reason: String,
    },

    /// Header value contains bytes not allowed in an HTTP header
    #[error("Invalid value for header '{name}': {reason}")]
    InvalidHeaderValue {
        /// Header the value was destined for
        name: String,
        /// Underlying parse failure
        reason: String,
    },
}

/// Rewriter configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Default content type is empty
    #[error("Default content type cannot be empty")]
    EmptyContentType,

    /// Default content type is not a legal header value
    #[error("Invalid default content type: {0}")]
    InvalidContentType(String),

    /// Excluded header name is not a legal header name
    #[error("Invalid excluded header name: {0}")]
    InvalidHeaderName(String),
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }
}
