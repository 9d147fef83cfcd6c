//! Schema synthesis and the name-mapping tables it produces.

mod mappings;
mod naming;
mod synthesizer;

pub use mappings::{NameMappings, NameMappingsBuilder};
pub use naming::{cli_name, formatted_name};
pub use synthesizer::{SchemaSynthesizer, SynthesizedSchema};
