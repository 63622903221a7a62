//! Rate limiting for LLM calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// A capability that paces outgoing LLM calls.
///
/// A token-bucket rate limiter, the same seam provider crates compose
/// (`with_rate_limiter`), minus provider-specific wiring.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Block until a call is permitted, then consume one unit of budget.
    async fn acquire(&self);
}

/// A token-bucket rate limiter held entirely in memory.
///
/// `requests_per_second` tokens are added continuously; `max_burst` caps how
/// many calls can fire back-to-back before the limiter starts pacing them.
pub struct InMemoryRateLimiter {
    requests_per_second: f64,
    check_interval: Duration,
    max_burst: f64,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl InMemoryRateLimiter {
    /// Construct a new token-bucket limiter.
    #[must_use]
    pub fn new(requests_per_second: f64, check_interval: Duration, max_burst: f64) -> Self {
        Self {
            requests_per_second,
            check_interval,
            max_burst,
            state: Mutex::new(BucketState {
                tokens: max_burst,
                last_refill: Instant::now(),
            }),
        }
    }

    fn try_consume(&self) -> bool {
        let mut state = self.state.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.requests_per_second).min(self.max_burst);
        state.last_refill = now;
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn acquire(&self) {
        while !self.try_consume() {
            tokio::time::sleep(self.check_interval).await;
        }
    }
}
