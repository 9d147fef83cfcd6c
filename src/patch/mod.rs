//! Source text patching of the generated client.
//!
//! Three passes share one [`PatchContext`]: the command dispatch file, the
//! mock-sender test file and the top-level integration tests. All three are
//! patched in memory before any of them is written back.

mod commands_file;
mod engine;
mod mock_senders;
mod replacements;
mod source;

use std::collections::BTreeMap;
use std::path::Path;

pub use commands_file::commands_patcher;
pub use engine::{LineRule, PatchReport, Patcher, Region, PATCH_MARKER};
pub use main_test::main_test_patcher;
pub use mock_senders::mock_senders_patcher;
pub use replacements::Replacements;
pub use source::SourceLines;

use crate::catalog::HardcodedParameters;
use crate::error::Result;
use crate::layout::GeneratedLayout;
use crate::schema::NameMappings;

static NO_PARAMETERS: BTreeMap<String, String> = BTreeMap::new();

/// Which generic operation a generated command maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Create,
    Update,
}

impl CommandKind {
    /// Prefix of the generated identifiers
    pub fn verb(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
        }
    }
}

/// Read-only lookup state shared by every patch pass of a run.
#[derive(Debug, Clone, Copy)]
pub struct PatchContext<'a> {
    pub mappings: &'a NameMappings,
    pub hardcoded: &'a HardcodedParameters,
    pub layout: &'a GeneratedLayout,
}

impl<'a> PatchContext<'a> {
    pub fn new(
        mappings: &'a NameMappings,
        hardcoded: &'a HardcodedParameters,
        layout: &'a GeneratedLayout,
    ) -> Self {
        Self {
            mappings,
            hardcoded,
            layout,
        }
    }

    /// Forced parameter values of one service (empty when none)
    pub fn hardcoded_for(&self, tool_type_id: &str) -> &'a BTreeMap<String, String> {
        self.hardcoded.get(tool_type_id).unwrap_or(&NO_PARAMETERS)
    }
}

/// Patch the three generated files under `root`.
///
/// Nothing is written unless every pass succeeds.
pub fn patch_generated_tree(root: &Path, ctx: &PatchContext<'_>) -> Result<()> {
    let commands_path = ctx.layout.commands_file(root);
    let mock_senders_path = ctx.layout.mock_senders_file(root);
    let main_test_path = ctx.layout.main_test_file(root);

    let mut commands = SourceLines::read(&commands_path)?;
    let mut mock_senders = SourceLines::read(&mock_senders_path)?;
    let mut main_test = SourceLines::read(&main_test_path)?;

    let report = commands_patcher(ctx, &display(&commands_path)).apply(&mut commands)?;
    log::info!(
        "Patched {} command functions, {} references",
        report.functions,
        report.replacements
    );

    let report = mock_senders_patcher(ctx, &display(&mock_senders_path)).apply(&mut mock_senders)?;
    log::info!(
        "Patched {} mock senders, {} references",
        report.functions,
        report.replacements
    );

    let main_test_patcher = main_test_patcher(ctx, &display(&main_test_path));
    for target in main_test_patcher.replacements().unmatched(main_test.lines()) {
        log::warn!("Expected request path '{target}' not found in {}", main_test_path.display());
    }
    let report = main_test_patcher.apply(&mut main_test)?;
    log::info!("Rewrote {} request paths", report.replacements);

    commands.write_atomic(&commands_path)?;
    mock_senders.write_atomic(&mock_senders_path)?;
    main_test.write_atomic(&main_test_path)?;
    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Render a Go interpreted string literal
pub(crate) fn go_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_string_escapes() {
        assert_eq!(go_string("us-south"), "\"us-south\"");
        assert_eq!(go_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(go_string("line\nnext\t"), "\"line\\nnext\\t\"");
        assert_eq!(go_string("\u{7}"), "\"\\x07\"");
    }

    #[test]
    fn hardcoded_lookup_defaults_to_empty() {
        let mappings = NameMappings::default();
        let mut hardcoded = HardcodedParameters::new();
        hardcoded.insert(
            "svc".into(),
            BTreeMap::from([("k".to_string(), "v".to_string())]),
        );
        let layout = GeneratedLayout::new("/tools", "pkg");
        let ctx = PatchContext::new(&mappings, &hardcoded, &layout);
        assert_eq!(ctx.hardcoded_for("svc").len(), 1);
        assert!(ctx.hardcoded_for("other").is_empty());
    }
}
