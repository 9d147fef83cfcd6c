//! Error types for the toolchain CLI generator.

use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum Error {
    /// A catalog or token endpoint answered with a non-success status
    #[error("{url} returned HTTP {status}{}", format_payload(.payload))]
    CatalogFetch {
        url: String,
        status: u16,
        /// Response body, pretty-printed when it was JSON
        payload: Option<String>,
    },

    /// Transport-level failure talking to the catalog or token endpoint
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Service metadata cannot be mapped unambiguously
    #[error("Schema synthesis failed for service '{service}': {reason}")]
    Synthesis { service: String, reason: String },

    /// The base API description lacks an expected template
    #[error("API description template error: {0}")]
    Template(String),

    /// A structural landmark is missing from a generated file.
    ///
    /// Usually means the generator changed its output format.
    #[error("Anchor '{anchor}' not found in {file} ({context})")]
    AnchorNotFound {
        file: String,
        context: String,
        anchor: String,
    },

    /// A name found in a generated file has no entry in the mapping tables
    #[error("Cannot resolve '{name}' for service '{service}' in {file} at line {line}")]
    UnresolvedName {
        file: String,
        service: String,
        name: String,
        line: usize,
    },

    /// The file already carries the patch marker
    #[error("{file} has already been patched; regenerate it before patching again")]
    AlreadyPatched { file: String },

    /// An external generator exited unsuccessfully
    #[error("'{command}' failed with {status}")]
    GeneratorFailed { command: String, status: String },

    /// Generator output did not appear in time
    #[error("Timed out after {seconds}s waiting for generated file {}", .path.display())]
    GenerationTimeout { path: PathBuf, seconds: u64 },

    /// File read/write failure
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON document
    #[error("Invalid JSON in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid or missing configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn synthesis(service: &str, reason: impl Into<String>) -> Self {
        Self::Synthesis {
            service: service.to_string(),
            reason: reason.into(),
        }
    }
}

fn format_payload(payload: &Option<String>) -> String {
    match payload {
        Some(body) if !body.is_empty() => format!(": {body}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_fetch_includes_payload() {
        let err = Error::CatalogFetch {
            url: "https://example.test/v1/services".to_string(),
            status: 401,
            payload: Some("{\n  \"errors\": []\n}".to_string()),
        };
        let message = err.to_string();
        assert!(message.starts_with("https://example.test/v1/services returned HTTP 401: {"));
        assert!(message.contains("\"errors\""));
    }

    #[test]
    fn catalog_fetch_without_payload() {
        let err = Error::CatalogFetch {
            url: "https://example.test".to_string(),
            status: 503,
            payload: None,
        };
        assert_eq!(err.to_string(), "https://example.test returned HTTP 503");
    }
}
