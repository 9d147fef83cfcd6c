//! Service catalog entries as delivered by the toolchain services endpoint.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Raw definition of a single service parameter.
///
/// Every field is optional in the catalog; absent flags default to `false`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParameterDefinition {
    /// Wire type (`string`, `boolean`, `password`, ...)
    #[serde(rename = "type")]
    pub wire_type: Option<String>,

    /// Preferred name for the parameter in generated clients
    pub terraform_alias: Option<String>,

    pub api_description: Option<String>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub example: Option<Value>,
    pub default: Option<Value>,

    #[serde(rename = "enum")]
    pub allowed_values: Option<Vec<Value>>,

    /// Parameter must never be exposed to clients
    #[serde(rename = "x-terraform-exclude", default)]
    pub exclude: bool,

    /// Parameter is computed by the broker, not supplied by callers
    #[serde(rename = "x-terraform-computed", default)]
    pub computed: bool,
}

impl ParameterDefinition {
    /// Name used to derive CLI and formatted names: the alias when declared
    pub fn effective_name<'a>(&'a self, raw_name: &'a str) -> &'a str {
        self.terraform_alias.as_deref().unwrap_or(raw_name)
    }

    /// Human description, preferring the API-facing text
    pub fn human_description(&self) -> Option<&str> {
        self.api_description
            .as_deref()
            .or(self.description.as_deref())
            .or(self.title.as_deref())
    }
}

/// One catalog entry, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResource {
    /// Stable machine name, also used as the tool type id
    pub unique_id: String,
    pub display_name: String,
    /// Parameters in catalog order
    pub parameters: Vec<(String, ParameterDefinition)>,
    /// Raw names of required parameters
    pub required: Vec<String>,
}

impl ServiceResource {
    /// Whether `raw_name` appears in the required list
    pub fn is_required(&self, raw_name: &str) -> bool {
        self.required.iter().any(|name| name == raw_name)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    metadata: EntryMetadata,
    entity: EntryEntity,
}

#[derive(Debug, Deserialize)]
struct EntryMetadata {
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(default)]
    parameters: Option<ParameterBlock>,
}

#[derive(Debug, Deserialize)]
struct EntryEntity {
    unique_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ParameterBlock {
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    required: Vec<String>,
}

/// The services catalog document.
///
/// `resources` keeps the catalog's key order so that generated output is
/// stable from run to run.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCatalog {
    #[serde(default)]
    pub resources: Map<String, Value>,
}

impl ServiceCatalog {
    /// Parse a catalog from its JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::json("service catalog", e))
    }

    /// Normalize every entry into a [`ServiceResource`]
    pub fn into_resources(self) -> Result<Vec<ServiceResource>> {
        self.resources
            .into_iter()
            .map(|(key, value)| {
                let entry: CatalogEntry = serde_json::from_value(value)
                    .map_err(|e| Error::json(format!("catalog entry '{key}'"), e))?;
                normalize(entry)
            })
            .collect()
    }
}

fn normalize(entry: CatalogEntry) -> Result<ServiceResource> {
    let block = entry.metadata.parameters.unwrap_or_default();
    let unique_id = entry.entity.unique_id;

    let parameters = block
        .properties
        .into_iter()
        .map(|(name, value)| {
            let definition: ParameterDefinition = serde_json::from_value(value).map_err(|e| {
                Error::json(format!("parameter '{name}' of service '{unique_id}'"), e)
            })?;
            Ok((name, definition))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ServiceResource {
        unique_id,
        display_name: entry.metadata.display_name,
        parameters,
        required: block.required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "resources": {
            "zeta": {
                "metadata": {
                    "displayName": "Zeta",
                    "parameters": {
                        "properties": {
                            "name": { "type": "string", "title": "Name" },
                            "api_key": { "type": "password", "x-terraform-exclude": true },
                            "instanceId": { "type": "string", "terraform_alias": "instance_id" }
                        },
                        "required": ["name"]
                    }
                },
                "entity": { "unique_id": "zeta" }
            },
            "alpha": {
                "metadata": { "displayName": "Alpha" },
                "entity": { "unique_id": "alpha_tool" }
            }
        }
    }"#;

    #[test]
    fn keeps_catalog_order() {
        let resources = ServiceCatalog::from_json(CATALOG)
            .unwrap()
            .into_resources()
            .unwrap();
        let ids: Vec<_> = resources.iter().map(|r| r.unique_id.as_str()).collect();
        assert_eq!(ids, ["zeta", "alpha_tool"]);

        let names: Vec<_> = resources[0].parameters.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["name", "api_key", "instanceId"]);
    }

    #[test]
    fn parses_flags_and_alias() {
        let resources = ServiceCatalog::from_json(CATALOG)
            .unwrap()
            .into_resources()
            .unwrap();
        let zeta = &resources[0];
        let (_, api_key) = &zeta.parameters[1];
        assert!(api_key.exclude);
        assert!(!api_key.computed);

        let (raw, instance) = &zeta.parameters[2];
        assert_eq!(instance.effective_name(raw), "instance_id");
        assert!(zeta.is_required("name"));
        assert!(!zeta.is_required("instanceId"));
    }

    #[test]
    fn service_without_parameters() {
        let resources = ServiceCatalog::from_json(CATALOG)
            .unwrap()
            .into_resources()
            .unwrap();
        assert!(resources[1].parameters.is_empty());
        assert!(resources[1].required.is_empty());
    }

    #[test]
    fn description_fallback_order() {
        let def = ParameterDefinition {
            title: Some("Title".into()),
            description: Some("Description".into()),
            ..Default::default()
        };
        assert_eq!(def.human_description(), Some("Description"));

        let def = ParameterDefinition {
            title: Some("Title".into()),
            ..Default::default()
        };
        assert_eq!(def.human_description(), Some("Title"));
    }

    #[test]
    fn malformed_entry_names_key() {
        let err = ServiceCatalog::from_json(r#"{"resources": {"broken": {"metadata": {}}}}"#)
            .unwrap()
            .into_resources()
            .unwrap_err();
        assert!(err.to_string().contains("catalog entry 'broken'"));
    }
}
