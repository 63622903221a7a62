//! `LLMClient` capability: provider routing, retry, and rate limiting for the
//! codeforge generation pipeline.
//!
//! This crate deliberately ships only a [`mock::MockLLMClient`] as a
//! ready-to-use implementation. Real providers implement [`client::LLMClient`]
//! the way a builder around a provider SDK client composes with
//! [`retry::RetryPolicy`] and an optional [`rate_limiter::RateLimiter`].

pub mod client;
pub mod error;
pub mod mock;
pub mod rate_limiter;
pub mod retry;

pub use client::{LLMClient, LLMResponse, ModelTier};
pub use error::{Error, Result};
pub use mock::MockLLMClient;
pub use rate_limiter::{InMemoryRateLimiter, RateLimiter};
pub use retry::{with_retry, RetryPolicy};
