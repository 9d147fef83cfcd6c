//! Generator for the toolchain CLI.
//!
//! The generic "create tool" and "update tool" operations of the toolchain API
//! take an untyped parameter bag. This crate turns the services catalog into
//! one typed create/update operation per tool type, feeds the rewritten API
//! description to the client generator, and then patches the generated Go
//! sources so every per-service command still talks to the generic endpoints.

pub mod catalog;
pub mod config;
pub mod embedded;
pub mod error;
pub mod generator;
pub mod layout;
pub mod openapi;
pub mod patch;
pub mod pipeline;
pub mod schema;

pub use config::Settings;
pub use error::{Error, Result};
pub use pipeline::{CatalogSource, GenerateOptions, Pipeline, Plan};
