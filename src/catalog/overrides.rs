//! Static overrides layered on top of the fetched catalog.
//!
//! Resolution runs in a fixed order: fetched metadata, then exclusions, then
//! hard-coded parameters. Nothing downstream consults the exclusion list again.

use std::collections::BTreeMap;

use super::model::ServiceResource;

/// Hard-coded parameter values, keyed by tool type id then wire field name
pub type HardcodedParameters = BTreeMap<String, BTreeMap<String, String>>;

/// A catalog entry that survived exclusion, with its forced parameter values.
#[derive(Debug, Clone)]
pub struct ResolvedService {
    pub resource: ServiceResource,
    pub hardcoded: BTreeMap<String, String>,
}

impl ResolvedService {
    pub fn unique_id(&self) -> &str {
        &self.resource.unique_id
    }
}

/// Catalog after overrides, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCatalog {
    pub services: Vec<ResolvedService>,
}

impl ResolvedCatalog {
    /// Hard-coded values of every resolved service that has some
    pub fn hardcoded(&self) -> HardcodedParameters {
        self.services
            .iter()
            .filter(|service| !service.hardcoded.is_empty())
            .map(|service| (service.unique_id().to_string(), service.hardcoded.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Apply exclusions, then attach hard-coded parameters
pub fn resolve_overrides(
    resources: Vec<ServiceResource>,
    excluded: &[String],
    hardcoded: &HardcodedParameters,
) -> ResolvedCatalog {
    let mut services = Vec::with_capacity(resources.len());

    for resource in resources {
        if excluded.iter().any(|id| *id == resource.unique_id) {
            log::info!("Skipping service: {}", resource.unique_id);
            continue;
        }

        let forced = hardcoded
            .get(&resource.unique_id)
            .cloned()
            .unwrap_or_default();
        services.push(ResolvedService {
            resource,
            hardcoded: forced,
        });
    }

    for service_id in hardcoded.keys() {
        if excluded.contains(service_id) {
            log::warn!("Hard-coded parameters configured for excluded service '{service_id}'");
        } else if !services.iter().any(|s| s.unique_id() == service_id) {
            log::warn!("Hard-coded parameters configured for unknown service '{service_id}'");
        }
    }

    ResolvedCatalog { services }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(id: &str) -> ServiceResource {
        ServiceResource {
            unique_id: id.to_string(),
            display_name: id.to_uppercase(),
            parameters: Vec::new(),
            required: Vec::new(),
        }
    }

    #[test]
    fn exclusions_apply_before_overrides() {
        let mut hardcoded = HardcodedParameters::new();
        hardcoded.insert(
            "private_worker".to_string(),
            BTreeMap::from([("type".to_string(), "new".to_string())]),
        );
        hardcoded.insert(
            "legacy".to_string(),
            BTreeMap::from([("mode".to_string(), "x".to_string())]),
        );

        let resolved = resolve_overrides(
            vec![resource("legacy"), resource("private_worker"), resource("github")],
            &["legacy".to_string()],
            &hardcoded,
        );

        let ids: Vec<_> = resolved.services.iter().map(|s| s.unique_id()).collect();
        assert_eq!(ids, ["private_worker", "github"]);
        assert_eq!(resolved.services[0].hardcoded["type"], "new");
        assert!(resolved.services[1].hardcoded.is_empty());

        let forced = resolved.hardcoded();
        assert_eq!(forced.len(), 1);
        assert!(forced.contains_key("private_worker"));
    }

    #[test]
    fn empty_catalog() {
        let resolved = resolve_overrides(Vec::new(), &[], &HardcodedParameters::new());
        assert!(resolved.is_empty());
        assert_eq!(resolved.len(), 0);
    }
}
