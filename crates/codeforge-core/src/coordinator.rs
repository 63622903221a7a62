//! The top-level pipeline state machine: dependency analysis, skeleton
//! generation, detail generation, contract extraction/validation/repair,
//! and deterministic config emission, assembled into one
//! [`GenerationResult`]. No per-file failure aborts the run.

use crate::config_gen;
use crate::contracts::extractor::{self, ExtractableFile};
use crate::contracts::{autofix, repair, validator, Contracts};
use crate::dependency;
use crate::detail::{DetailGenerator, GenerationContext, WorkerGenerator, WorkerKind};
use crate::model::{GeneratedFile, GenerationResult, ProjectSpec, RunMetadata};
use crate::skeleton::SkeletonGenerator;
use codeforge_llm::LLMClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Tunables for one pipeline run. Built with `with_*` methods rather than
/// read from globals.
#[derive(Clone)]
pub struct CoordinatorConfig {
    /// The client skeleton generation, repair, and (transitively, via
    /// workers) detail generation call through.
    pub llm_client: Arc<dyn LLMClient>,
    /// Per-file-kind detail generators.
    pub workers: HashMap<WorkerKind, Arc<dyn WorkerGenerator>>,
    /// Cap on files per skeleton-generation batch.
    pub max_skeleton_batch: usize,
    /// Pause between skeleton batches.
    pub skeleton_batch_delay: Duration,
    /// Pause between detail-generation layers.
    pub detail_layer_delay: Duration,
}

impl CoordinatorConfig {
    /// A config using `client` for both skeletons and repair, with no
    /// detail workers registered (every file falls back to its skeleton
    /// until workers are added via [`Self::with_worker`]).
    #[must_use]
    pub fn new(llm_client: Arc<dyn LLMClient>) -> Self {
        Self {
            llm_client,
            workers: HashMap::new(),
            max_skeleton_batch: crate::skeleton::DEFAULT_MAX_BATCH,
            skeleton_batch_delay: Duration::ZERO,
            detail_layer_delay: Duration::from_millis(1500),
        }
    }

    /// Builder: register a worker for one kind.
    #[must_use]
    pub fn with_worker(mut self, kind: WorkerKind, worker: Arc<dyn WorkerGenerator>) -> Self {
        self.workers.insert(kind, worker);
        self
    }

    /// Builder: override the skeleton batch size.
    #[must_use]
    pub fn with_max_skeleton_batch(mut self, max: usize) -> Self {
        self.max_skeleton_batch = max.max(1);
        self
    }

    /// Builder: pause this long between skeleton batches.
    #[must_use]
    pub fn with_skeleton_batch_delay(mut self, delay: Duration) -> Self {
        self.skeleton_batch_delay = delay;
        self
    }

    /// Builder: pause this long between detail-generation layers.
    #[must_use]
    pub fn with_detail_layer_delay(mut self, delay: Duration) -> Self {
        self.detail_layer_delay = delay;
        self
    }
}

/// Drives one end-to-end generation run.
pub struct Coordinator {
    config: CoordinatorConfig,
}

impl Coordinator {
    /// Build a coordinator from `config`.
    #[must_use]
    pub fn new(config: CoordinatorConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline against `spec`.
    ///
    /// ```
    /// use codeforge_core::coordinator::{Coordinator, CoordinatorConfig};
    /// use codeforge_core::model::{FileSpec, ProjectSpec};
    /// use codeforge_llm::MockLLMClient;
    /// use std::sync::Arc;
    ///
    /// # tokio_test::block_on(async {
    /// let spec = ProjectSpec {
    ///     summary: "a single script".into(),
    ///     files: vec![FileSpec::new("app.js", "javascript", "entry point").unwrap()],
    ///     contracts: Default::default(),
    ///     project_config: Default::default(),
    ///     setup: Default::default(),
    /// };
    /// let config = CoordinatorConfig::new(Arc::new(MockLLMClient::echoing()));
    /// let result = Coordinator::new(config).run(&spec).await;
    /// assert!(!result.files.is_empty());
    /// # });
    /// ```
    pub async fn run(&self, spec: &ProjectSpec) -> GenerationResult {
        let request_id = uuid::Uuid::new_v4();
        let received_at = chrono::Utc::now();
        let mut notes = Vec::new();

        let mut contracts = spec.contracts.clone();

        let skeleton_generator = SkeletonGenerator::new(self.config.llm_client.clone())
            .with_max_batch(self.config.max_skeleton_batch)
            .with_batch_delay(self.config.skeleton_batch_delay);
        let (skeletons, skeleton_notes) = skeleton_generator.generate(&spec.files, &contracts).await;
        notes.extend(skeleton_notes);

        let skeleton_sources: Vec<ExtractableFile<'_>> = spec
            .files
            .iter()
            .filter_map(|f| skeletons.get(&f.path).map(|text| ExtractableFile {
                path: f.path.as_str(),
                content: text.as_str(),
            }))
            .collect();
        contracts.merge(extractor::extract(&skeleton_sources));

        let layering = dependency::analyze(&spec.files, &skeletons);
        if !layering.broken_edges.is_empty() {
            notes.push(format!(
                "broke {} dependency cycle edge(s) to produce a layering",
                layering.broken_edges.len()
            ));
        }

        let context = GenerationContext {
            summary: spec.summary.clone(),
            skeletons,
            contracts: contracts.clone(),
            project_config: spec.project_config.clone(),
            generated_so_far: HashMap::new(),
        };

        let detail_generator = DetailGenerator::new(self.config.workers.clone())
            .with_layer_delay(self.config.detail_layer_delay);
        let generated_files = detail_generator.generate(&spec.files, &layering, context).await;

        let generated_sources: Vec<ExtractableFile<'_>> = generated_files
            .iter()
            .map(|f| ExtractableFile {
                path: f.path.as_str(),
                content: f.content.as_str(),
            })
            .collect();
        contracts.merge(extractor::extract(&generated_sources));

        let config_files = config_gen::generate(&spec.summary, &spec.setup);
        let mut all_files: Vec<GeneratedFile> = generated_files;
        all_files.extend(config_files);

        let validation = validator::validate(&contracts, &all_files);
        notes.push(format!("contract validation found {} issue(s)", validation.issues.len()));

        let autofix_outcome = autofix::autofix(&mut contracts, &mut all_files, &validation);
        if !autofix_outcome.fixes.is_empty() {
            notes.push(format!("autofix applied {} fix(es)", autofix_outcome.fixes.len()));
        }

        if !autofix_outcome.remaining.is_empty() {
            let attempts = repair::repair(
                &mut contracts,
                &mut all_files,
                &autofix_outcome.remaining,
                &self.config.llm_client,
            )
            .await;
            let renamed = attempts
                .iter()
                .filter(|a| matches!(a.outcome, repair::RepairOutcome::Renamed { .. }))
                .count();
            notes.push(format!(
                "repair agent reviewed {} remaining issue(s), renamed {renamed}",
                attempts.len()
            ));
        }

        let total_files = all_files.len();
        let failed_files = all_files.iter().filter(|f| f.error.is_some()).count();
        let total_tokens = all_files.iter().map(|f| f.metadata.tokens_used).sum();
        if failed_files > 0 {
            notes.push(format!("{failed_files} file(s) fell back after a generation failure"));
        }

        info!(
            request_id = %request_id,
            total_files = all_files.len(),
            failed_files,
            "generation run complete"
        );

        GenerationResult {
            request_id,
            received_at,
            files: all_files,
            notes,
            metadata: RunMetadata {
                total_files,
                failed_files,
                total_tokens,
                pipeline_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}
