//! Name-mapping tables shared by every patch pass.
//!
//! Built once during synthesis through [`NameMappingsBuilder`] and then frozen
//! into an immutable [`NameMappings`] that is handed to each pass by reference.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// Immutable lookup context for one generation run.
#[derive(Debug, Clone, Default)]
pub struct NameMappings {
    /// service id -> CLI name -> wire field
    cli_to_wire: BTreeMap<String, BTreeMap<String, String>>,
    /// formatted service -> formatted field -> wire field
    formatted_to_wire: BTreeMap<String, BTreeMap<String, String>>,
    /// formatted service -> tool type id
    tool_type_ids: BTreeMap<String, String>,
    /// service ids with at least one synthesized property
    with_parameters: BTreeSet<String>,
}

impl NameMappings {
    /// Wire field for a CLI flag of the given service
    pub fn wire_for_cli(&self, service_id: &str, cli_name: &str) -> Option<&str> {
        self.cli_to_wire
            .get(service_id)?
            .get(cli_name)
            .map(String::as_str)
    }

    /// Wire field for a generated property accessor of the given formatted service
    pub fn wire_for_formatted(&self, formatted_service: &str, formatted_field: &str) -> Option<&str> {
        self.formatted_to_wire
            .get(formatted_service)?
            .get(formatted_field)
            .map(String::as_str)
    }

    /// Tool type id for a formatted service name
    pub fn tool_type_id(&self, formatted_service: &str) -> Option<&str> {
        self.tool_type_ids.get(formatted_service).map(String::as_str)
    }

    pub fn has_parameters(&self, service_id: &str) -> bool {
        self.with_parameters.contains(service_id)
    }

    /// `(formatted service, tool type id)` pairs, ordered by formatted name
    pub fn services(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tool_type_ids
            .iter()
            .map(|(formatted, id)| (formatted.as_str(), id.as_str()))
    }

    pub fn service_count(&self) -> usize {
        self.tool_type_ids.len()
    }
}

/// Collects mapping entries and rejects ambiguous ones.
#[derive(Debug, Default)]
pub struct NameMappingsBuilder {
    mappings: NameMappings,
}

impl NameMappingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service under its formatted identity
    pub fn register_service(&mut self, service_id: &str, formatted_service: &str) -> Result<()> {
        if let Some(existing) = self.mappings.tool_type_ids.get(formatted_service) {
            return Err(Error::synthesis(
                service_id,
                format!(
                    "formatted name '{formatted_service}' is already used by service '{existing}'"
                ),
            ));
        }

        self.mappings
            .tool_type_ids
            .insert(formatted_service.to_string(), service_id.to_string());
        self.mappings
            .cli_to_wire
            .insert(service_id.to_string(), BTreeMap::new());
        self.mappings
            .formatted_to_wire
            .insert(formatted_service.to_string(), BTreeMap::new());
        Ok(())
    }

    /// Record one parameter of a registered service
    pub fn insert_parameter(
        &mut self,
        service_id: &str,
        formatted_service: &str,
        cli_name: &str,
        formatted_field: &str,
        wire_field: &str,
    ) -> Result<()> {
        let cli_table = self
            .mappings
            .cli_to_wire
            .get_mut(service_id)
            .ok_or_else(|| Error::synthesis(service_id, "service was never registered"))?;
        if let Some(existing) = cli_table.get(cli_name) {
            return Err(Error::synthesis(
                service_id,
                format!("fields '{existing}' and '{wire_field}' both map to CLI name '{cli_name}'"),
            ));
        }

        let formatted_table = self
            .mappings
            .formatted_to_wire
            .get_mut(formatted_service)
            .ok_or_else(|| Error::synthesis(service_id, "service was never registered"))?;
        if let Some(existing) = formatted_table.get(formatted_field) {
            return Err(Error::synthesis(
                service_id,
                format!(
                    "fields '{existing}' and '{wire_field}' both map to property '{formatted_field}'"
                ),
            ));
        }

        cli_table.insert(cli_name.to_string(), wire_field.to_string());
        formatted_table.insert(formatted_field.to_string(), wire_field.to_string());
        Ok(())
    }

    pub fn mark_with_parameters(&mut self, service_id: &str) {
        self.mappings.with_parameters.insert(service_id.to_string());
    }

    pub fn build(self) -> NameMappings {
        self.mappings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_after_build() {
        let mut builder = NameMappingsBuilder::new();
        builder.register_service("private_worker", "PrivateWorker").unwrap();
        builder
            .insert_parameter(
                "private_worker",
                "PrivateWorker",
                "worker-queue-credentials",
                "WorkerQueueCredentials",
                "workerQueueCredentials",
            )
            .unwrap();
        builder.mark_with_parameters("private_worker");
        let mappings = builder.build();

        assert_eq!(
            mappings.wire_for_cli("private_worker", "worker-queue-credentials"),
            Some("workerQueueCredentials")
        );
        assert_eq!(
            mappings.wire_for_formatted("PrivateWorker", "WorkerQueueCredentials"),
            Some("workerQueueCredentials")
        );
        assert_eq!(mappings.tool_type_id("PrivateWorker"), Some("private_worker"));
        assert!(mappings.has_parameters("private_worker"));
        assert_eq!(mappings.wire_for_cli("private_worker", "missing"), None);
        assert_eq!(mappings.wire_for_cli("unknown", "name"), None);
    }

    #[test]
    fn duplicate_cli_name_is_rejected() {
        let mut builder = NameMappingsBuilder::new();
        builder.register_service("svc", "Svc").unwrap();
        builder
            .insert_parameter("svc", "Svc", "region", "Region", "region")
            .unwrap();
        let err = builder
            .insert_parameter("svc", "Svc", "region", "RegionAlt", "Region")
            .unwrap_err();
        assert!(err.to_string().contains("both map to CLI name 'region'"));
    }

    #[test]
    fn duplicate_formatted_service_is_rejected() {
        let mut builder = NameMappingsBuilder::new();
        builder.register_service("my_service", "MyService").unwrap();
        let err = builder.register_service("my-service", "MyService").unwrap_err();
        assert!(matches!(err, Error::Synthesis { ref service, .. } if service == "my-service"));
    }
}
