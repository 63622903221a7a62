//! Exponential backoff retry for transient LLM failures.
//!
//! `RetryPolicy::exponential(3)` plus `with_retry`, scoped to the handful
//! of transient [`crate::Error`] variants this capability defines.

use crate::error::Error;
use std::future::Future;
use std::time::Duration;

/// Retry policy for a single LLM call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Backoff for the first retry; doubles on each subsequent retry.
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Exponential backoff starting at one second, doubling each retry.
    #[must_use]
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_secs(1),
        }
    }

    /// No retries at all.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_secs(0),
        }
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(3)
    }
}

/// Run `op`, retrying on transient errors per `policy`.
///
/// Non-transient errors ([`Error::SafetyBlock`], [`Error::QuotaExceeded`],
/// [`Error::InvalidRequest`]) are surfaced immediately without a retry.
///
/// ```
/// use codeforge_llm::{with_retry, Error, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy { max_retries: 1, initial_backoff: Duration::from_millis(1) };
/// let mut attempts = 0;
/// let result: Result<&str, Error> = with_retry(policy, || {
///     attempts += 1;
///     async move {
///         if attempts < 2 {
///             Err(Error::Transport("flaky".into()))
///         } else {
///             Ok("ok")
///         }
///     }
/// })
/// .await;
/// assert_eq!(result.unwrap(), "ok");
/// # });
/// ```
pub async fn with_retry<F, Fut, T>(policy: RetryPolicy, mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                let backoff = policy.backoff_for(attempt);
                tracing::warn!(attempt, ?backoff, error = %err, "retrying transient LLM error");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
