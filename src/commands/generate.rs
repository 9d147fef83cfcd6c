use anyhow::{Context, Result};
use std::path::PathBuf;

use toolchain_cli_gen::{CatalogSource, GenerateOptions, Pipeline, Settings};

/// Handle the `toolchain-cli-gen generate` subcommand
pub async fn handle_generate(
    settings: Settings,
    target: PathBuf,
    api_definition: PathBuf,
    work_dir: PathBuf,
    catalog: CatalogSource,
) -> Result<()> {
    if !api_definition.is_file() {
        anyhow::bail!("API definition not found: {}", api_definition.display());
    }

    let options = GenerateOptions {
        api_definition,
        target,
        work_dir,
        catalog,
    };
    let plan = Pipeline::new(settings)
        .generate(&options)
        .await
        .with_context(|| format!("Failed to generate CLI into {}", options.target.display()))?;

    super::print_summary(&plan);
    eprintln!("✓ CLI generated in {}", options.target.display());
    Ok(())
}
