//! Layered settings.
//!
//! Later layers override earlier ones key by key (objects merge, everything
//! else replaces):
//!
//! 1. `config/defaults.json` embedded in the binary
//! 2. `<config-dir>/defaults.json`
//! 3. `<config-dir>/local.json`, only when `TOOLGEN_ENV=local`
//! 4. `TOOLGEN__<KEY>` environment variables; `__` nests into objects and
//!    values are parsed as JSON, falling back to a plain string

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::catalog::HardcodedParameters;
use crate::embedded;
use crate::error::{Error, Result};
use crate::generator::WaitPolicy;
use crate::layout::GeneratedLayout;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "TOOLGEN__";
/// Selects the optional `local.json` layer
pub const ENV_SELECTOR: &str = "TOOLGEN_ENV";
const LOCAL_FILE: &str = "local.json";

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    pub allowed_parameter_types: Vec<String>,
    #[serde(default)]
    pub excluded_services: Vec<String>,
    #[serde(default)]
    pub hardcoded_service_parameters: HardcodedParameters,
    pub iam_token_url: String,
    pub catalog_url: String,
    pub tools_path: String,
    pub sdk_package: String,
    pub expand_command: String,
    pub generate_command: String,
    pub generation_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Settings {
    /// Load from the process environment
    pub fn load(config_dir: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_dir, std::env::vars())
    }

    /// Load with an explicit set of environment variables
    pub fn load_with_env<I>(config_dir: Option<&Path>, env: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env: Vec<(String, String)> = env.into_iter().collect();

        let defaults = embedded::default_settings()
            .ok_or_else(|| Error::Config("embedded defaults are missing".to_string()))?;
        let mut merged = serde_json::from_str::<Value>(defaults)
            .map_err(|e| Error::json("embedded defaults", e))?;

        if let Some(dir) = config_dir {
            merge_file(&mut merged, &dir.join(embedded::DEFAULTS_FILE))?;

            let local = env
                .iter()
                .any(|(key, value)| key == ENV_SELECTOR && value == "local");
            if local {
                merge_file(&mut merged, &dir.join(LOCAL_FILE))?;
            }
        }

        for (key, value) in &env {
            if let Some(path) = key.strip_prefix(ENV_PREFIX) {
                log::debug!("Applying environment override {key}");
                apply_env_override(&mut merged, path, value);
            }
        }

        let settings: Settings =
            serde_json::from_value(merged).map_err(|e| Error::json("merged settings", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.allowed_parameter_types.is_empty() {
            return Err(Error::Config(
                "ALLOWED_PARAMETER_TYPES must name at least one type".to_string(),
            ));
        }
        if self.sdk_package.trim().is_empty() {
            return Err(Error::Config("SDK_PACKAGE must not be empty".to_string()));
        }
        if !self.tools_path.starts_with('/') {
            return Err(Error::Config(format!(
                "TOOLS_PATH must be an absolute API path, got '{}'",
                self.tools_path
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("POLL_INTERVAL_MS must be positive".to_string()));
        }
        Ok(())
    }

    pub fn layout(&self) -> GeneratedLayout {
        GeneratedLayout::new(&self.tools_path, &self.sdk_package)
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_secs(self.generation_timeout_secs),
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}

/// Merge a JSON file into `base`; a missing file is skipped
fn merge_file(base: &mut Value, path: &Path) -> Result<()> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No settings file at {}", path.display());
            return Ok(());
        }
        Err(e) => return Err(Error::io(path, e)),
    };
    let layer: Value =
        serde_json::from_str(&text).map_err(|e| Error::json(path.display().to_string(), e))?;
    log::debug!("Loaded settings from {}", path.display());
    merge(base, layer);
    Ok(())
}

/// Deep merge: objects merge key by key, anything else replaces
fn merge(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn apply_env_override(base: &mut Value, path: &str, raw: &str) {
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    let layer = path
        .rsplit("__")
        .filter(|segment| !segment.is_empty())
        .fold(value, |inner, segment| {
            let mut object = Map::new();
            object.insert(segment.to_string(), inner);
            Value::Object(object)
        });
    merge(base, layer);
}
