use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use toolchain_cli_gen::CatalogSource;

/// Toolchain CLI generator
///
/// Builds per-tool create/update commands from the toolchain services catalog:
/// - synthesizes a request schema for every tool type
/// - rewrites the API description and runs the client generator
/// - patches the generated Go sources onto the generic tool endpoints
#[derive(Parser, Debug)]
#[command(name = "toolchain-cli-gen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Directory with `defaults.json` (and `local.json` when TOOLGEN_ENV=local)
    ///
    /// Values there override the built-in defaults; `TOOLGEN__<KEY>`
    /// environment variables override both.
    #[arg(long, value_name = "DIR", env = "TOOLGEN_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand, synthesize, generate the CLI and patch it
    Generate {
        /// Directory the client generator writes into
        #[arg(value_name = "TARGET_DIR")]
        target: PathBuf,

        /// Base API description of the toolchain service
        #[arg(value_name = "API_DEFINITION")]
        api_definition: PathBuf,

        /// Directory for the intermediate `swagger/` files
        #[arg(long, value_name = "DIR", default_value = ".")]
        work_dir: PathBuf,

        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Rewrite an expanded API description without running any generator
    Synthesize {
        /// Expanded API description to read
        #[arg(long, short, value_name = "PATH")]
        input: PathBuf,

        /// Where to write the rewritten description
        #[arg(long, short, value_name = "PATH")]
        output: PathBuf,

        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Patch an already generated CLI tree
    Patch {
        /// Root of the generated CLI
        #[arg(value_name = "TARGET_DIR")]
        target: PathBuf,

        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

/// Where to read the services catalog from
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// API key exchanged for a bearer token to fetch the live catalog
    #[arg(long, env = "IBM_CLOUD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Read the catalog from a JSON file instead of the live endpoint
    ///
    /// Example: --catalog ./services.json
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,
}

impl CatalogArgs {
    /// Catalog file wins over the API key
    pub fn source(&self) -> anyhow::Result<CatalogSource> {
        if let Some(path) = &self.catalog {
            return Ok(CatalogSource::File(path.clone()));
        }
        match &self.api_key {
            Some(key) if !key.trim().is_empty() => Ok(CatalogSource::Remote {
                api_key: key.clone(),
            }),
            _ => anyhow::bail!(
                "No services catalog: pass --catalog <PATH> or set IBM_CLOUD_API_KEY / --api-key"
            ),
        }
    }
}
