//! Error types for the LLM client capability.

use thiserror::Error;

/// Error returned by an [`crate::LLMClient`] implementation.
#[non_exhaustive]
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Transport-level failure: connection refused, DNS failure, timeout, 5xx.
    #[error("LLM transport error: {0}")]
    Transport(String),

    /// Provider returned a rate-limit response (429 or equivalent).
    #[error("LLM rate limit exceeded: {0}")]
    RateLimit(String),

    /// Provider refused the request on safety grounds.
    #[error("LLM safety block: {0}")]
    SafetyBlock(String),

    /// Account/plan quota exhausted.
    #[error("LLM quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Request was rejected for a reason that will not resolve with a retry (4xx).
    #[error("LLM request rejected: {0}")]
    InvalidRequest(String),

    /// The call exceeded its configured timeout.
    #[error("LLM call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl Error {
    /// Whether this error class is worth retrying (transient).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::RateLimit(_) | Error::Timeout(_))
    }
}

/// Result type for LLM client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_flagged() {
        assert!(Error::Transport("boom".into()).is_transient());
        assert!(Error::RateLimit("slow down".into()).is_transient());
        assert!(Error::Timeout(std::time::Duration::from_secs(1)).is_transient());
    }

    #[test]
    fn non_transient_errors_are_not_flagged() {
        assert!(!Error::SafetyBlock("nope".into()).is_transient());
        assert!(!Error::QuotaExceeded("nope".into()).is_transient());
        assert!(!Error::InvalidRequest("bad shape".into()).is_transient());
    }

    #[test]
    fn display_messages_are_informative() {
        let err = Error::RateLimit("too many requests".into());
        assert!(err.to_string().contains("rate limit"));
    }
}
