//! Phase 2: detail generation. Files are generated layer by layer —
//! everything in one layer runs concurrently, but a layer never starts
//! before the previous one has fully finished, so a worker generating
//! `app.js` can see the already-generated content of the `utils.js` it
//! imports.

use crate::contracts::extractor::{self, ExtractableFile};
use crate::contracts::Contracts;
use crate::model::{FileMetadata, FileSpec, GeneratedFile, GenerationMethod, ProjectConfig, Skeletons};
use crate::dependency::LayerAssignment;
use async_trait::async_trait;
use codeforge_llm::ModelTier;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, warn};

/// Which family of worker handles a file, selected from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    /// HTML/XML markup.
    Markup,
    /// CSS and its preprocessor dialects.
    Style,
    /// JavaScript/TypeScript.
    Script,
    /// Python.
    Python,
    /// Everything else: config files, shell scripts, Dockerfiles, READMEs.
    System,
}

/// Select the worker kind for a file from its extension.
#[must_use]
pub fn worker_kind_for(file: &FileSpec) -> WorkerKind {
    match file.extension() {
        "html" | "htm" | "xml" => WorkerKind::Markup,
        "css" | "scss" | "sass" | "less" => WorkerKind::Style,
        "js" | "ts" | "jsx" | "tsx" | "mjs" | "cjs" => WorkerKind::Script,
        "py" => WorkerKind::Python,
        _ => WorkerKind::System,
    }
}

/// The model tier a worker kind generates at by default. Markup and style
/// are mechanical enough for the fast tier; script and Python bodies
/// benefit from the strong tier; system files (configs, scripts) are fast.
#[must_use]
pub fn model_tier_for(kind: WorkerKind) -> ModelTier {
    match kind {
        WorkerKind::Markup | WorkerKind::Style | WorkerKind::System => ModelTier::Fast,
        WorkerKind::Script | WorkerKind::Python => ModelTier::Strong,
    }
}

/// Read-only context every worker sees: the overall requirement, every
/// file's skeleton (including its own, and its not-yet-detailed siblings),
/// the contracts accumulated so far, and deployment parameters.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    /// The original natural-language requirement.
    pub summary: String,
    /// Every file's skeleton text, keyed by path.
    pub skeletons: Skeletons,
    /// Contracts extracted from files generated in earlier layers.
    pub contracts: Contracts,
    /// Deployment parameters from the project spec.
    pub project_config: ProjectConfig,
    /// Full content of files already generated in earlier layers, keyed by
    /// path — the detail a skeleton alone can't provide.
    pub generated_so_far: HashMap<String, String>,
}

/// What a worker produces for one file.
#[derive(Debug, Clone)]
pub struct WorkerOutput {
    /// The generated file content.
    pub content: String,
    /// Tokens the underlying LLM call consumed.
    pub tokens_used: u32,
}

/// A capability that turns one [`FileSpec`] into file content, given the
/// shared [`GenerationContext`].
#[async_trait]
pub trait WorkerGenerator: Send + Sync {
    /// Generate this file's content.
    async fn generate(&self, file: &FileSpec, context: &GenerationContext) -> crate::error::Result<WorkerOutput>;

    /// Which [`WorkerKind`] this implementation handles.
    fn kind(&self) -> WorkerKind;
}

/// Drives layer-by-layer detail generation across a set of per-kind
/// workers.
pub struct DetailGenerator {
    workers: HashMap<WorkerKind, Arc<dyn WorkerGenerator>>,
    layer_delay: Duration,
}

impl DetailGenerator {
    /// Build a generator from one worker per [`WorkerKind`] it should
    /// handle. A kind with no registered worker falls back to skeleton
    /// content for every file of that kind.
    #[must_use]
    pub fn new(workers: HashMap<WorkerKind, Arc<dyn WorkerGenerator>>) -> Self {
        Self {
            workers,
            layer_delay: Duration::ZERO,
        }
    }

    /// Builder: pause this long between layers.
    #[must_use]
    pub fn with_layer_delay(mut self, delay: Duration) -> Self {
        self.layer_delay = delay;
        self
    }

    /// Generate every file across every layer, in strict layer order.
    /// Files within a layer run concurrently. A single file's failure never
    /// aborts the run: it is recorded with `.error` set and its skeleton
    /// substituted as content.
    pub async fn generate(
        &self,
        files: &[FileSpec],
        layering: &LayerAssignment,
        mut context: GenerationContext,
    ) -> Vec<GeneratedFile> {
        let by_path: HashMap<&str, &FileSpec> = files.iter().map(|f| (f.path.as_str(), f)).collect();
        let mut results = Vec::with_capacity(files.len());

        for (layer_index, layer_paths) in layering.layers.iter().enumerate() {
            if layer_index > 0 && !self.layer_delay.is_zero() {
                tokio::time::sleep(self.layer_delay).await;
            }

            let shared_context = Arc::new(context.clone());
            let mut joins: JoinSet<GeneratedFile> = JoinSet::new();
            for path in layer_paths {
                let Some(file) = by_path.get(path.as_str()).copied().cloned() else {
                    continue;
                };
                let layer = layer_index as u32;
                let worker = self.workers.get(&worker_kind_for(&file)).cloned();
                let context = shared_context.clone();
                joins.spawn(async move { generate_one(file, layer, worker, context).await });
            }

            let mut layer_results = Vec::with_capacity(layer_paths.len());
            while let Some(joined) = joins.join_next().await {
                match joined {
                    Ok(generated) => layer_results.push(generated),
                    Err(join_err) => error!(error = %join_err, "detail generation task panicked"),
                }
            }
            layer_results.sort_by(|a, b| a.path.cmp(&b.path));

            for generated in &layer_results {
                context
                    .generated_so_far
                    .insert(generated.path.clone(), generated.content.clone());
            }

            let is_last_layer = layer_index + 1 == layering.layers.len();
            if !is_last_layer && !layer_results.is_empty() {
                let extractable: Vec<ExtractableFile<'_>> = layer_results
                    .iter()
                    .map(|f| ExtractableFile {
                        path: f.path.as_str(),
                        content: f.content.as_str(),
                    })
                    .collect();
                context.contracts.merge(extractor::extract(&extractable));
            }

            results.extend(layer_results);
        }

        results
    }
}

async fn generate_one(
    file: FileSpec,
    layer: u32,
    worker: Option<Arc<dyn WorkerGenerator>>,
    context: Arc<GenerationContext>,
) -> GeneratedFile {
    if file.is_auto_generated {
        let content = file.template.clone().unwrap_or_default();
        return GeneratedFile {
            path: file.path,
            content,
            language: file.language,
            error: None,
            layer,
            metadata: FileMetadata {
                tokens_used: 0,
                method: GenerationMethod::AutoGenerated,
            },
        };
    }

    let skeleton = context.skeletons.get(&file.path).cloned().unwrap_or_default();

    let Some(worker) = worker else {
        warn!(path = %file.path, "no worker registered for this file kind, using skeleton as content");
        return GeneratedFile {
            path: file.path.clone(),
            content: skeleton,
            language: file.language,
            error: Some("no worker registered for this file's kind".to_string()),
            layer,
            metadata: FileMetadata {
                tokens_used: 0,
                method: GenerationMethod::SkeletonFallback,
            },
        };
    };

    match worker.generate(&file, &context).await {
        Ok(output) => GeneratedFile {
            path: file.path,
            content: output.content,
            language: file.language,
            error: None,
            layer,
            metadata: FileMetadata {
                tokens_used: output.tokens_used,
                method: GenerationMethod::WorkerLlm,
            },
        },
        Err(err) => {
            warn!(path = %file.path, error = %err, "worker generation failed, falling back to skeleton");
            GeneratedFile {
                path: file.path,
                content: skeleton,
                language: file.language,
                error: Some(err.to_string()),
                layer,
                metadata: FileMetadata {
                    tokens_used: 0,
                    method: GenerationMethod::SkeletonFallback,
                },
            }
        }
    }
}
