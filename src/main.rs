use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use toolchain_cli_gen::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG overrides the default)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    let settings = Settings::load(cli.config_dir.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Generate {
            target,
            api_definition,
            work_dir,
            catalog,
        } => {
            commands::handle_generate(settings, target, api_definition, work_dir, catalog.source()?)
                .await
        }
        Commands::Synthesize {
            input,
            output,
            catalog,
        } => commands::handle_synthesize(settings, input, output, catalog.source()?).await,
        Commands::Patch { target, catalog } => {
            commands::handle_patch(settings, target, catalog.source()?).await
        }
    }
}
