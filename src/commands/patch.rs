use anyhow::{Context, Result};
use std::path::PathBuf;

use toolchain_cli_gen::{CatalogSource, Pipeline, Settings};

/// Handle the `toolchain-cli-gen patch` subcommand
pub async fn handle_patch(settings: Settings, target: PathBuf, catalog: CatalogSource) -> Result<()> {
    let pipeline = Pipeline::new(settings);
    for path in pipeline.layout().generated_files(&target) {
        if !path.is_file() {
            anyhow::bail!("Generated file not found: {}", path.display());
        }
    }

    let plan = pipeline
        .patch(&target, &catalog)
        .await
        .with_context(|| format!("Failed to patch generated CLI in {}", target.display()))?;

    super::print_summary(&plan);
    eprintln!("✓ Patched generated CLI in {}", target.display());
    Ok(())
}
