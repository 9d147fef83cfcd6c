//! Per-service request schema synthesis.

use serde_json::{json, Map, Value};

use super::mappings::{NameMappings, NameMappingsBuilder};
use super::naming::{cli_name, formatted_name};
use crate::catalog::{ParameterDefinition, ServiceResource};
use crate::error::{Error, Result};

/// Wire type shown to clients as a plain string
const PASSWORD_TYPE: &str = "password";

/// Request body schema synthesized for one service.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedSchema {
    pub service_id: String,
    pub display_name: String,
    /// CLI name -> property schema, in catalog order
    pub properties: Map<String, Value>,
    /// CLI names of required properties, in catalog order
    pub required: Vec<String>,
}

impl SynthesizedSchema {
    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    /// JSON-Schema object for a request body.
    ///
    /// `required` is only emitted when requested and non-empty.
    pub fn body_schema(&self, with_required: bool) -> Value {
        let mut schema = json!({
            "type": "object",
            "properties": Value::Object(self.properties.clone()),
            "additionalProperties": false,
        });
        if with_required && !self.required.is_empty() {
            schema["required"] = json!(self.required);
        }
        schema
    }
}

/// Turns catalog entries into request schemas and fills the name mappings.
#[derive(Debug)]
pub struct SchemaSynthesizer<'a> {
    allowed_types: &'a [String],
    mappings: NameMappingsBuilder,
}

impl<'a> SchemaSynthesizer<'a> {
    pub fn new(allowed_types: &'a [String]) -> Self {
        Self {
            allowed_types,
            mappings: NameMappingsBuilder::new(),
        }
    }

    /// Synthesize the schema of one service and record its mappings
    pub fn synthesize(&mut self, resource: &ServiceResource) -> Result<SynthesizedSchema> {
        let service_id = resource.unique_id.as_str();
        let formatted_service = formatted_name(service_id);
        if formatted_service.is_empty() {
            return Err(Error::synthesis(service_id, "service id yields an empty name"));
        }
        self.mappings.register_service(service_id, &formatted_service)?;

        let mut properties = Map::new();
        let mut required = Vec::new();

        for (raw_name, definition) in &resource.parameters {
            if let Some(reason) = self.exclusion_reason(definition) {
                log::info!("Skipping parameter: {raw_name} ({reason})");
                continue;
            }

            let effective = definition.effective_name(raw_name);
            let cli = cli_name(effective);
            if cli.is_empty() {
                return Err(Error::synthesis(
                    service_id,
                    format!("parameter '{raw_name}' yields an empty CLI name"),
                ));
            }

            self.mappings.insert_parameter(
                service_id,
                &formatted_service,
                &cli,
                &formatted_name(effective),
                raw_name,
            )?;

            if resource.is_required(raw_name) {
                required.push(cli.clone());
            }
            properties.insert(cli.clone(), property_schema(&cli, definition));
        }

        if properties.is_empty() {
            log::info!("Service {service_id} has no parameters");
        } else {
            self.mappings.mark_with_parameters(service_id);
        }
        log::info!(
            "Properties in schema: {:?}",
            properties.keys().collect::<Vec<_>>()
        );

        Ok(SynthesizedSchema {
            service_id: service_id.to_string(),
            display_name: resource.display_name.clone(),
            properties,
            required,
        })
    }

    /// Freeze the collected mappings
    pub fn finish(self) -> NameMappings {
        self.mappings.build()
    }

    fn exclusion_reason(&self, definition: &ParameterDefinition) -> Option<&'static str> {
        if definition.exclude {
            return Some("excluded");
        }
        if definition.computed {
            return Some("computed");
        }
        match definition.wire_type.as_deref() {
            Some(wire_type) if self.allowed_types.iter().any(|t| t == wire_type) => None,
            _ => Some("type not allowed"),
        }
    }
}

fn property_schema(cli: &str, definition: &ParameterDefinition) -> Value {
    let wire_type = match definition.wire_type.as_deref() {
        Some(PASSWORD_TYPE) | None => "string",
        Some(other) => other,
    };

    let mut schema = Map::new();
    schema.insert("type".into(), json!(wire_type));
    if let Some(description) = definition.human_description() {
        schema.insert("description".into(), json!(description));
    }
    schema.insert("x-cli-option-name".into(), json!(cli));
    if let Some(example) = &definition.example {
        schema.insert("example".into(), example.clone());
    }
    if let Some(default) = &definition.default {
        schema.insert("default".into(), default.clone());
    }
    if let Some(values) = &definition.allowed_values {
        schema.insert("enum".into(), json!(values));
    }
    Value::Object(schema)
}
