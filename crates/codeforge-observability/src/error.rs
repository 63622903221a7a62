//! Error types for observability setup.

use thiserror::Error;

/// Error type for observability operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// The global subscriber was already installed.
    #[error("tracing subscriber already initialized")]
    AlreadyInitialized,

    /// The env filter directive string failed to parse.
    #[error("invalid log filter directive {0:?}: {1}")]
    InvalidFilter(String, String),
}

/// Result type for observability operations.
pub type Result<T> = std::result::Result<T, Error>;
