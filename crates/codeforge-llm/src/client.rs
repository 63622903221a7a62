//! The `LLMClient` capability: the single seam through which the pipeline
//! talks to a language model.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A hint for which class of model should serve a call.
///
/// `SkeletonGenerator`/`DetailGenerator` classify each file by its model
/// tier and pass the result through so a provider can route simple
/// markup/config files to a cheaper model than script/system code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModelTier {
    /// Cheap/fast model: CSS, HTML, JSON, plain text, env, markdown.
    #[default]
    Fast,
    /// Full-capability model: scripts, Python, system languages.
    Strong,
}

/// The response from a single LLM call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    /// Raw text returned by the model.
    pub content: String,
    /// Tokens consumed by prompt + completion, if the provider reports it.
    pub tokens_used: u32,
}

/// Capability for issuing a single prompt to a language model.
///
/// Implementors own provider routing, retry-on-transient-failure, and
/// rate-limit backoff; the pipeline only ever sees [`LLMResponse`] or
/// an [`Error`].
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Issue one prompt and return its text and token count.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        tier: ModelTier,
    ) -> Result<LLMResponse>;

    /// A short, human-readable identifier for logs (e.g. "openai:gpt-4o-mini").
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_tier_defaults_to_fast() {
        assert_eq!(ModelTier::default(), ModelTier::Fast);
    }

    #[test]
    fn llm_response_is_serde_round_trippable() {
        let resp = LLMResponse {
            content: "hello".into(),
            tokens_used: 12,
        };
        let json = serde_json::to_string(&resp).unwrap();
        let back: LLMResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, "hello");
        assert_eq!(back.tokens_used, 12);
    }

    #[test]
    fn error_type_is_usable_as_dyn_error_bound_check() {
        // Compile-time assertion that Result<T> composes with `?` in async fns;
        // exercised properly by client implementations' own tests.
        fn _assert() -> Result<()> {
            Err(Error::Transport("unused".into()))
        }
    }
}
