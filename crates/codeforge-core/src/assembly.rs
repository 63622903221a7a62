//! Writing a [`GenerationResult`] to disk. No branching logic worth unit
//! testing here — it's a thin wrapper over `tokio::fs`.

use crate::error::Result;
use crate::model::GenerationResult;
use std::path::Path;

/// Write every file in `result` under `out_dir`, creating parent
/// directories as needed.
pub async fn write_to_disk(result: &GenerationResult, out_dir: &Path) -> Result<()> {
    for generated in &result.files {
        let target = out_dir.join(&generated.path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &generated.content).await?;
    }
    Ok(())
}
