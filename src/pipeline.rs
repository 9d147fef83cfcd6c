//! End-to-end orchestration.
//!
//! `generate` runs the whole chain: expand the base description, fetch the
//! catalog, synthesize per-service schemas, rewrite the description, run the
//! client generator and patch its output. The pure middle part ([`Pipeline::plan`],
//! [`Pipeline::mutate_description`], [`Pipeline::patch_tree`]) is usable on its
//! own for offline runs and tests.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::catalog::{
    resolve_overrides, CatalogClient, HardcodedParameters, ResolvedCatalog, ServiceCatalog,
    ServiceResource,
};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::generator::{wait_for_outputs, GeneratorCommand};
use crate::layout::GeneratedLayout;
use crate::openapi::ApiDescriptionMutator;
use crate::patch::{patch_generated_tree, PatchContext};
use crate::schema::{NameMappings, SchemaSynthesizer, SynthesizedSchema};

/// Directory, relative to the working directory, for intermediate descriptions
pub const SWAGGER_DIR: &str = "swagger";
/// File the schema expander writes into [`SWAGGER_DIR`]
pub const EXPANDED_FILE: &str = "openapi.json";
/// File the modified description is written to in [`SWAGGER_DIR`]
pub const MODIFIED_FILE: &str = "swagger.json";

/// Where service metadata comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// A catalog JSON document on disk
    File(PathBuf),
    /// The live catalog, authenticated with an API key
    Remote { api_key: String },
}

/// Everything derived from the catalog before any file is touched.
#[derive(Debug, Clone)]
pub struct Plan {
    pub catalog: ResolvedCatalog,
    pub schemas: Vec<SynthesizedSchema>,
    pub mappings: NameMappings,
    pub hardcoded: HardcodedParameters,
}

/// Inputs of a full generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Base API description handed to the schema expander
    pub api_definition: PathBuf,
    /// Directory the client generator writes into
    pub target: PathBuf,
    /// Directory holding the intermediate `swagger/` files
    pub work_dir: PathBuf,
    pub catalog: CatalogSource,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: Settings,
    layout: GeneratedLayout,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        let layout = settings.layout();
        Self { settings, layout }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn layout(&self) -> &GeneratedLayout {
        &self.layout
    }

    /// Read catalog resources from a file or the live endpoint
    pub async fn load_catalog(&self, source: &CatalogSource) -> Result<Vec<ServiceResource>> {
        let catalog = match source {
            CatalogSource::File(path) => {
                log::info!("Reading services catalog from {}", path.display());
                let text = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| Error::io(path.clone(), e))?;
                ServiceCatalog::from_json(&text)?
            }
            CatalogSource::Remote { api_key } => {
                log::info!("Fetching services catalog");
                let client =
                    CatalogClient::new(&self.settings.iam_token_url, &self.settings.catalog_url);
                let token = client.bearer_token(api_key).await?;
                client.services(&token).await?
            }
        };
        catalog.into_resources()
    }

    /// Resolve overrides and synthesize every service schema
    pub fn plan(&self, resources: Vec<ServiceResource>) -> Result<Plan> {
        let catalog = resolve_overrides(
            resources,
            &self.settings.excluded_services,
            &self.settings.hardcoded_service_parameters,
        );
        let hardcoded = catalog.hardcoded();

        let mut synthesizer = SchemaSynthesizer::new(&self.settings.allowed_parameter_types);
        let mut schemas = Vec::with_capacity(catalog.len());
        for service in &catalog.services {
            log::info!("Generating schema for service: {}", service.unique_id());
            schemas.push(synthesizer.synthesize(&service.resource)?);
        }
        let mappings = synthesizer.finish();
        log::info!("Synthesized {} service schemas", mappings.service_count());

        Ok(Plan {
            catalog,
            schemas,
            mappings,
            hardcoded,
        })
    }

    /// Specialize the generic tool operations for every planned service
    pub fn mutate_description(&self, description: Value, plan: &Plan) -> Result<Value> {
        log::info!("Modifying API description");
        let mut mutator = ApiDescriptionMutator::new(description, &self.layout)?;
        for schema in &plan.schemas {
            mutator.add_service(schema)?;
        }
        mutator.finish()
    }

    /// Patch an already generated client tree
    pub fn patch_tree(&self, target: &Path, plan: &Plan) -> Result<()> {
        log::info!("Patching generated files in {}", target.display());
        let ctx = PatchContext::new(&plan.mappings, &plan.hardcoded, &self.layout);
        patch_generated_tree(target, &ctx)
    }

    /// Rewrite `input` into `output` without running any generator
    pub async fn synthesize(
        &self,
        input: &Path,
        output: &Path,
        source: &CatalogSource,
    ) -> Result<Plan> {
        let description = read_json(input).await?;
        let plan = self.plan(self.load_catalog(source).await?)?;
        let modified = self.mutate_description(description, &plan)?;
        write_json(output, &modified).await?;
        Ok(plan)
    }

    /// Patch `target` using metadata from `source`
    pub async fn patch(&self, target: &Path, source: &CatalogSource) -> Result<Plan> {
        let plan = self.plan(self.load_catalog(source).await?)?;
        self.patch_tree(target, &plan)?;
        Ok(plan)
    }

    /// Full run: expand, synthesize, generate, patch
    pub async fn generate(&self, options: &GenerateOptions) -> Result<Plan> {
        // generators run inside the work dir, so every path they see is absolute
        let work_dir = absolute(&options.work_dir)?;
        let api_definition = absolute(&options.api_definition)?;
        let target = absolute(&options.target)?;
        tokio::fs::create_dir_all(&work_dir)
            .await
            .map_err(|e| Error::io(work_dir.clone(), e))?;

        let swagger_dir = work_dir.join(SWAGGER_DIR);
        let expanded = swagger_dir.join(EXPANDED_FILE);
        let modified = swagger_dir.join(MODIFIED_FILE);
        let policy = self.settings.wait_policy();

        log::info!("Expanding API description {}", api_definition.display());
        GeneratorCommand::render(&self.settings.expand_command, &api_definition, &swagger_dir)?
            .run(&work_dir)
            .await?;
        wait_for_outputs(std::slice::from_ref(&expanded), policy).await?;

        let plan = self
            .synthesize(&expanded, &modified, &options.catalog)
            .await?;

        log::info!("Generating CLI into {}", target.display());
        GeneratorCommand::render(&self.settings.generate_command, &modified, &target)?
            .run(&work_dir)
            .await?;
        wait_for_outputs(&self.layout.generated_files(&target), policy).await?;

        self.patch_tree(&target, &plan)?;
        log::info!("Done");
        Ok(plan)
    }
}

/// Resolve against the current directory without touching the filesystem
fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| Error::io(path, e))
}

async fn read_json(path: &Path) -> Result<Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| Error::json(path.display().to_string(), e))
}

async fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Error::json(path.display().to_string(), e))?;
    tokio::fs::write(path, text)
        .await
        .map_err(|e| Error::io(path, e))
}
