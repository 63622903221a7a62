//! `codeforge generate` — run the generation pipeline against a JSON
//! project spec and write the resulting files to disk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codeforge_core::coordinator::{Coordinator, CoordinatorConfig};
use codeforge_core::model::ProjectSpec;
use codeforge_llm::{LLMClient, MockLLMClient};
use codeforge_observability::TracingConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "codeforge", version, about = "Layered skeleton-then-detail code generation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a multi-file project from a JSON project spec.
    Generate {
        /// Path to a JSON-encoded `ProjectSpec`.
        #[arg(long)]
        spec: PathBuf,

        /// Directory to write the generated project into.
        #[arg(long, default_value = "generated-project")]
        out: PathBuf,

        /// Use the deterministic mock LLM client instead of a live provider.
        #[arg(long)]
        mock: bool,

        /// Override the skeleton-generation batch size.
        #[arg(long)]
        max_skeleton_batch: Option<usize>,

        /// Pause this many milliseconds between detail-generation layers.
        #[arg(long)]
        detail_delay_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    codeforge_observability::init(&TracingConfig::new())
        .context("failed to initialize logging")?;

    match cli.command {
        Command::Generate {
            spec,
            out,
            mock,
            max_skeleton_batch,
            detail_delay_ms,
        } => generate(spec, out, mock, max_skeleton_batch, detail_delay_ms).await,
    }
}

async fn generate(
    spec_path: PathBuf,
    out_dir: PathBuf,
    mock: bool,
    max_skeleton_batch: Option<usize>,
    detail_delay_ms: Option<u64>,
) -> Result<()> {
    let spec_text = tokio::fs::read_to_string(&spec_path)
        .await
        .with_context(|| format!("reading project spec at {}", spec_path.display()))?;
    let spec: ProjectSpec =
        serde_json::from_str(&spec_text).context("parsing project spec as JSON")?;

    if !mock {
        anyhow::bail!(
            "no live LLM provider is compiled into this binary; rerun with --mock to use \
             the deterministic mock client"
        );
    }
    let client: Arc<dyn LLMClient> = Arc::new(MockLLMClient::echoing());

    let mut config = CoordinatorConfig::new(client.clone());
    for (kind, worker) in codeforge_workers::default_workers(client.clone()) {
        config = config.with_worker(kind, worker);
    }
    if let Some(max_batch) = max_skeleton_batch {
        config = config.with_max_skeleton_batch(max_batch);
    }
    if let Some(delay_ms) = detail_delay_ms {
        config = config.with_detail_layer_delay(Duration::from_millis(delay_ms));
    }

    let coordinator = Coordinator::new(config);
    let result = coordinator.run(&spec).await;

    tokio::fs::create_dir_all(&out_dir)
        .await
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    codeforge_core::assembly::write_to_disk(&result, &out_dir)
        .await
        .context("writing generated files to disk")?;

    info!(
        request_id = %result.request_id,
        total_files = result.metadata.total_files,
        failed_files = result.metadata.failed_files,
        total_tokens = result.metadata.total_tokens,
        out_dir = %out_dir.display(),
        "generation complete"
    );
    for note in &result.notes {
        info!("{note}");
    }

    Ok(())
}
