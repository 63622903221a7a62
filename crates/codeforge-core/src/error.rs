//! Error types for the generation pipeline core.

use thiserror::Error;

/// Error type for the codeforge-core pipeline.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A `FileSpec.path` escaped the project root or used a disallowed extension.
    #[error("invalid file path {0:?}: {1}")]
    InvalidFileSpec(String, String),

    /// The LLM capability failed in a way the caller asked us to surface
    /// rather than fall back from (used internally for invariant checks).
    #[error(transparent)]
    Llm(#[from] codeforge_llm::Error),

    /// A coordinator invariant was violated — a programming bug, not a
    /// per-file generation failure. These are fatal and carry diagnostic
    /// context instead of panicking.
    #[error("pipeline invariant violated: {0}")]
    Invariant(String),

    /// Filesystem I/O failure while assembling or writing the project.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for codeforge-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_error_message_includes_detail() {
        let err = Error::Invariant("missing skeleton for src/app.js".into());
        assert!(err.to_string().contains("src/app.js"));
    }

    #[test]
    fn invalid_file_spec_message_includes_path_and_reason() {
        let err = Error::InvalidFileSpec("../etc/passwd".into(), "escapes project root".into());
        let msg = err.to_string();
        assert!(msg.contains("../etc/passwd"));
        assert!(msg.contains("escapes project root"));
    }

    #[test]
    fn wraps_llm_errors_transparently() {
        let llm_err = codeforge_llm::Error::RateLimit("slow down".into());
        let err: Error = llm_err.into();
        assert!(err.to_string().contains("rate limit"));
    }
}
