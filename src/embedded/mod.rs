//! Configuration assets bundled at compile time
//!
//! The `config/` directory is embedded into the binary so the generator runs
//! with sensible defaults without any configuration files on disk.

use include_dir::{include_dir, Dir};

/// Embedded `config/` directory
///
/// Directory structure:
/// ```text
/// config/
/// └── defaults.json
/// ```
pub static CONFIG_ASSETS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/config");

/// Name of the defaults file, both embedded and in a config directory
pub const DEFAULTS_FILE: &str = "defaults.json";

/// Get any embedded file by path relative to `config/`
pub fn get_file(path: &str) -> Option<&'static str> {
    CONFIG_ASSETS.get_file(path)?.contents_utf8()
}

/// Built-in settings document
pub fn default_settings() -> Option<&'static str> {
    get_file(DEFAULTS_FILE)
}
