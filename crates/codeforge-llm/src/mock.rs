//! A deterministic [`LLMClient`] used by `--mock` CLI runs and by every test
//! in this workspace. No test or CLI default path makes a network call.
//!
//! A small scripting surface so both skeleton-phase (JSON array) and
//! detail-phase (raw source) prompts can be driven deterministically.

use crate::client::{LLMClient, LLMResponse, ModelTier};
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// What the mock does on each call.
#[derive(Debug, Clone)]
enum Behavior {
    /// Always return this fixed text.
    Canned(String),
    /// Pop the next response off a queue; once exhausted, fall back to `Echo`.
    Scripted(VecDeque<String>),
    /// Echo the user prompt back, prefixed so tests can tell it's synthetic.
    Echo,
    /// Always fail with this error.
    Failing(Error),
}

/// Deterministic stand-in for a real provider.
pub struct MockLLMClient {
    behavior: Mutex<Behavior>,
    calls: Mutex<Vec<MockCall>>,
}

/// A single recorded call, for test assertions.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// The system prompt passed in.
    pub system_prompt: String,
    /// The user prompt passed in.
    pub user_prompt: String,
    /// The tier hint passed in.
    pub tier: ModelTier,
}

impl MockLLMClient {
    /// A mock that always returns `text`.
    #[must_use]
    pub fn canned(text: impl Into<String>) -> Self {
        Self {
            behavior: Mutex::new(Behavior::Canned(text.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A mock that returns each of `responses` in order, then echoes.
    #[must_use]
    pub fn scripted(responses: impl IntoIterator<Item = String>) -> Self {
        Self {
            behavior: Mutex::new(Behavior::Scripted(responses.into_iter().collect())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A mock that echoes the user prompt back (default, used when no
    /// canned response is needed).
    #[must_use]
    pub fn echoing() -> Self {
        Self {
            behavior: Mutex::new(Behavior::Echo),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A mock that always fails with `error`, for exercising fallback paths.
    #[must_use]
    pub fn failing(error: Error) -> Self {
        Self {
            behavior: Mutex::new(Behavior::Failing(error)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// All calls made to this mock so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }
}

impl Default for MockLLMClient {
    fn default() -> Self {
        Self::echoing()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _max_tokens: u32,
        tier: ModelTier,
    ) -> Result<LLMResponse> {
        self.calls.lock().push(MockCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            tier,
        });

        let mut behavior = self.behavior.lock();
        let content = match &mut *behavior {
            Behavior::Canned(text) => text.clone(),
            Behavior::Scripted(queue) => match queue.pop_front() {
                Some(text) => text,
                None => format!("mock response to: {user_prompt}"),
            },
            Behavior::Echo => format!("mock response to: {user_prompt}"),
            Behavior::Failing(err) => return Err(err.clone()),
        };

        Ok(LLMResponse {
            tokens_used: content.len() as u32 / 4,
            content,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
