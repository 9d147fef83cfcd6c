use anyhow::{Context, Result};
use std::path::PathBuf;

use toolchain_cli_gen::{CatalogSource, Pipeline, Settings};

/// Handle the `toolchain-cli-gen synthesize` subcommand
pub async fn handle_synthesize(
    settings: Settings,
    input: PathBuf,
    output: PathBuf,
    catalog: CatalogSource,
) -> Result<()> {
    let plan = Pipeline::new(settings)
        .synthesize(&input, &output, &catalog)
        .await
        .with_context(|| format!("Failed to rewrite API description {}", input.display()))?;

    super::print_summary(&plan);
    eprintln!("✓ Modified API description written to {}", output.display());
    Ok(())
}
