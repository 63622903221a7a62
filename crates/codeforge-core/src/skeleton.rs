//! Phase 1: skeleton generation. Files are batched by language so a
//! single LLM call can produce skeletons for several related files at once;
//! batches are capped in size and spaced out to stay under rate limits.

use crate::contracts::{ContractKind, Contracts};
use crate::model::{FileSpec, Skeletons};
use codeforge_llm::{LLMClient, ModelTier};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Default cap on files per skeleton-generation batch.
pub const DEFAULT_MAX_BATCH: usize = 30;

/// Generates layer-1 skeletons: short, structurally complete stand-ins for
/// each file's eventual content (signatures, top-level declarations,
/// `TODO` bodies) that later phases use as dependency context.
pub struct SkeletonGenerator {
    client: Arc<dyn LLMClient>,
    max_batch: usize,
    batch_delay: Duration,
}

impl SkeletonGenerator {
    /// A generator with the default batch size and no inter-batch delay.
    #[must_use]
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            max_batch: DEFAULT_MAX_BATCH,
            batch_delay: Duration::ZERO,
        }
    }

    /// Builder: override the per-batch file cap.
    #[must_use]
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch.max(1);
        self
    }

    /// Builder: pause this long between batches.
    #[must_use]
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Produce a skeleton for every file in `files`. Files with a template
    /// already attached skip the LLM call entirely (a template is a strong
    /// enough starting point on its own). `contracts` carries any
    /// identifiers already known from the spec itself (or, on repeated
    /// calls, from earlier phases) so batches can be told to echo them
    /// verbatim instead of inventing new names.
    pub async fn generate(&self, files: &[FileSpec], contracts: &Contracts) -> (Skeletons, Vec<String>) {
        let mut skeletons = Skeletons::new();
        let mut notes = Vec::new();

        let mut to_generate: Vec<&FileSpec> = Vec::new();
        for file in files {
            if let Some(template) = &file.template {
                skeletons.insert(file.path.clone(), template.clone());
            } else {
                to_generate.push(file);
            }
        }

        let mut by_language: BTreeMap<&str, Vec<&FileSpec>> = BTreeMap::new();
        for file in &to_generate {
            by_language.entry(file.language.as_str()).or_default().push(file);
        }

        let mut first_batch = true;
        for (language, group) in by_language {
            for batch in group.chunks(self.max_batch) {
                if !first_batch && !self.batch_delay.is_zero() {
                    tokio::time::sleep(self.batch_delay).await;
                }
                first_batch = false;
                self.generate_batch(language, batch, contracts, &mut skeletons, &mut notes).await;
            }
        }

        (skeletons, notes)
    }

    async fn generate_batch(
        &self,
        language: &str,
        batch: &[&FileSpec],
        contracts: &Contracts,
        skeletons: &mut Skeletons,
        notes: &mut Vec<String>,
    ) {
        let prompt = batch_prompt(language, batch, contracts);
        let mut parsed = self.request_skeletons(&prompt).await;
        if parsed.is_none() {
            // One retry before falling back to a minimal shell.
            parsed = self.request_skeletons(&prompt).await;
        }

        match parsed {
            Some(map) => {
                for file in batch {
                    match map.get(&file.path) {
                        Some(skeleton) => {
                            skeletons.insert(file.path.clone(), skeleton.clone());
                        }
                        None => {
                            notes.push(format!(
                                "{}: missing from skeleton batch response, using fallback shell",
                                file.path
                            ));
                            skeletons.insert(file.path.clone(), fallback_shell(file));
                        }
                    }
                }
            }
            None => {
                notes.push(format!(
                    "skeleton batch for language {language:?} ({} files) could not be parsed after retry, using fallback shells",
                    batch.len()
                ));
                for file in batch {
                    skeletons.insert(file.path.clone(), fallback_shell(file));
                }
            }
        }
    }

    async fn request_skeletons(&self, prompt: &str) -> Option<BTreeMap<String, String>> {
        let response = self
            .client
            .generate(SYSTEM_PROMPT, prompt, 2048, ModelTier::Fast)
            .await;
        match response {
            Ok(response) => parse_skeleton_reply(&response.content),
            Err(err) => {
                warn!(error = %err, "skeleton batch LLM call failed");
                None
            }
        }
    }
}

const SYSTEM_PROMPT: &str = "You write structural skeletons for source files in a multi-file \
project: signatures, imports, and top-level declarations with TODO bodies, not full \
implementations. Reply with a single JSON object mapping each file path to its skeleton text, \
and nothing else.";

fn batch_prompt(language: &str, batch: &[&FileSpec], contracts: &Contracts) -> String {
    let mut prompt = format!("Language: {language}\nFiles:\n");
    for file in batch {
        prompt.push_str(&format!(
            "- {} : {}\n  requirements: {:?}\n",
            file.path, file.description, file.requirements
        ));
    }
    if contracts.key_count() > 0 {
        prompt.push_str(
            "\nExisting contracts — echo these exact identifiers verbatim wherever this file references them:\n",
        );
        for kind in ContractKind::ALL {
            let table = contracts.table(kind);
            if table.is_empty() {
                continue;
            }
            prompt.push_str(&format!(
                "{}: {}\n",
                kind.label(),
                table.keys().cloned().collect::<Vec<_>>().join(", ")
            ));
        }
    }
    prompt
}

fn fallback_shell(file: &FileSpec) -> String {
    match file.extension() {
        "py" => format!("# {}\n# TODO: {}\n", file.path, file.description),
        "html" | "htm" => format!("<!-- {} -->\n<!-- TODO: {} -->\n", file.path, file.description),
        "css" | "scss" | "sass" | "less" => {
            format!("/* {} */\n/* TODO: {} */\n", file.path, file.description)
        }
        _ => format!("// {}\n// TODO: {}\n", file.path, file.description),
    }
}

/// Tolerantly parse an LLM reply expected to be a JSON object of
/// `path -> skeleton text`. Strips markdown code fences, then falls back to
/// extracting the outermost `{ ... }` span if the object isn't the whole
/// reply.
fn parse_skeleton_reply(content: &str) -> Option<BTreeMap<String, String>> {
    let stripped = strip_code_fence(content);
    if let Ok(map) = serde_json::from_str::<BTreeMap<String, String>>(stripped) {
        return Some(map);
    }
    let braced = extract_braced_span(stripped)?;
    serde_json::from_str::<BTreeMap<String, String>>(braced).ok()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\n', '\r']);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn extract_braced_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}
