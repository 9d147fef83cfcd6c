//! Service catalog: wire model, HTTP client and override resolution.

mod client;
mod model;
mod overrides;

pub use client::CatalogClient;
pub use model::{ParameterDefinition, ServiceCatalog, ServiceResource};
pub use overrides::{resolve_overrides, HardcodedParameters, ResolvedCatalog, ResolvedService};
