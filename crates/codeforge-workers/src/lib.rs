//! Per-file-kind [`WorkerGenerator`] implementations. Every
//! kind shares one LLM-calling core ([`LlmWorker`]) and differs only in its
//! system prompt, sharing one retry/rate-limit seam and differing only in
//! wire format.

use async_trait::async_trait;
use codeforge_core::contracts::ContractKind;
use codeforge_core::detail::{model_tier_for, GenerationContext, WorkerGenerator, WorkerKind, WorkerOutput};
use codeforge_core::error::Result;
use codeforge_core::model::FileSpec;
use codeforge_llm::{with_retry, LLMClient, RetryPolicy};
use std::sync::Arc;

const MARKUP_SYSTEM_PROMPT: &str = "You write complete, valid HTML/XML files for a multi-file web \
project. Use the given skeleton and sibling file list as ground truth for ids, classes, and script/\
link references. Reply with the file content only, no commentary and no markdown code fences.";

const STYLE_SYSTEM_PROMPT: &str = "You write complete CSS (or a CSS preprocessor dialect) for a \
multi-file web project. Match the selectors implied by the given HTML skeleton. Reply with the file \
content only, no commentary and no markdown code fences.";

const SCRIPT_SYSTEM_PROMPT: &str = "You write complete JavaScript/TypeScript source files for a \
multi-file project. Honor the DOM ids, API endpoints, storage keys, and module exports already \
observed in sibling files. Reply with the file content only, no commentary and no markdown code \
fences.";

const PYTHON_SYSTEM_PROMPT: &str = "You write complete Python source files for a multi-file \
project. Honor the routes and imports already observed in sibling files. Reply with the file \
content only, no commentary and no markdown code fences.";

const SYSTEM_SYSTEM_PROMPT: &str = "You write complete configuration, shell script, or build files \
for a multi-file project (not source code in a specific programming language). Reply with the file \
content only, no commentary and no markdown code fences.";

fn system_prompt_for(kind: WorkerKind) -> &'static str {
    match kind {
        WorkerKind::Markup => MARKUP_SYSTEM_PROMPT,
        WorkerKind::Style => STYLE_SYSTEM_PROMPT,
        WorkerKind::Script => SCRIPT_SYSTEM_PROMPT,
        WorkerKind::Python => PYTHON_SYSTEM_PROMPT,
        WorkerKind::System => SYSTEM_SYSTEM_PROMPT,
    }
}

/// Build the user-facing prompt: the requirement summary, this file's own
/// skeleton, and enough contract context (keys this file produces or
/// consumes per the accumulated [`codeforge_core::contracts::Contracts`])
/// that the model doesn't have to guess sibling identifiers.
fn build_user_prompt(file: &FileSpec, context: &GenerationContext) -> String {
    let mut prompt = format!(
        "Project summary: {}\n\nFile to write: {} ({})\nDescription: {}\nRequirements: {:?}\n",
        context.summary, file.path, file.language, file.description, file.requirements
    );

    if let Some(skeleton) = context.skeletons.get(&file.path) {
        prompt.push_str(&format!("\nSkeleton for this file:\n{skeleton}\n"));
    }

    let mut relevant_keys = Vec::new();
    for kind in ContractKind::ALL {
        for (key, entry) in context.contracts.table(kind) {
            if entry.producers.contains(&file.path) || entry.consumers.contains(&file.path) {
                relevant_keys.push(format!("{}: {key}", kind.label()));
            }
        }
    }
    if !relevant_keys.is_empty() {
        prompt.push_str("\nCross-file identifiers this file participates in:\n");
        for key in relevant_keys {
            prompt.push_str(&format!("- {key}\n"));
        }
    }

    prompt
}

fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let without_lang = match rest.find('\n') {
        Some(idx) if rest[..idx].chars().all(|c| c.is_alphanumeric()) => &rest[idx + 1..],
        _ => rest,
    };
    without_lang.strip_suffix("```").unwrap_or(without_lang).trim().to_string()
}

/// An LLM-backed [`WorkerGenerator`] for one [`WorkerKind`]. All five
/// per-kind workers in this crate are this type under a different prompt.
pub struct LlmWorker {
    client: Arc<dyn LLMClient>,
    kind: WorkerKind,
    retry_policy: RetryPolicy,
}

impl LlmWorker {
    /// Build a worker for `kind` backed by `client`, using the default
    /// exponential retry policy.
    ///
    /// ```
    /// use codeforge_core::detail::{GenerationContext, WorkerGenerator, WorkerKind};
    /// use codeforge_core::model::FileSpec;
    /// use codeforge_llm::{LLMClient, MockLLMClient};
    /// use codeforge_workers::LlmWorker;
    /// use std::sync::Arc;
    ///
    /// # tokio_test::block_on(async {
    /// let client: Arc<dyn LLMClient> = Arc::new(MockLLMClient::canned("console.log(1);"));
    /// let worker = LlmWorker::new(client, WorkerKind::Script);
    /// let file = FileSpec::new("app.js", "javascript", "entry point").unwrap();
    /// let output = worker.generate(&file, &GenerationContext::default()).await.unwrap();
    /// assert_eq!(output.content, "console.log(1);");
    /// # });
    /// ```
    #[must_use]
    pub fn new(client: Arc<dyn LLMClient>, kind: WorkerKind) -> Self {
        Self {
            client,
            kind,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Builder: override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }
}

#[async_trait]
impl WorkerGenerator for LlmWorker {
    async fn generate(&self, file: &FileSpec, context: &GenerationContext) -> Result<WorkerOutput> {
        let system_prompt = system_prompt_for(self.kind);
        let user_prompt = build_user_prompt(file, context);
        let tier = model_tier_for(self.kind);
        let client = self.client.clone();

        let response = with_retry(self.retry_policy, move || {
            let client = client.clone();
            let user_prompt = user_prompt.clone();
            async move { client.generate(system_prompt, &user_prompt, 4096, tier).await }
        })
        .await?;

        Ok(WorkerOutput {
            content: strip_code_fence(&response.content),
            tokens_used: response.tokens_used,
        })
    }

    fn kind(&self) -> WorkerKind {
        self.kind
    }
}

/// Build one [`LlmWorker`] per [`WorkerKind`], all sharing `client`, ready
/// to hand to `CoordinatorConfig::with_worker` for each kind.
#[must_use]
pub fn default_workers(
    client: Arc<dyn LLMClient>,
) -> std::collections::HashMap<WorkerKind, Arc<dyn WorkerGenerator>> {
    let mut workers: std::collections::HashMap<WorkerKind, Arc<dyn WorkerGenerator>> = std::collections::HashMap::new();
    for kind in [
        WorkerKind::Markup,
        WorkerKind::Style,
        WorkerKind::Script,
        WorkerKind::Python,
        WorkerKind::System,
    ] {
        workers.insert(kind, Arc::new(LlmWorker::new(client.clone(), kind)));
    }
    workers
}
