//! Points the generated mock-sender assertions at the generic parameter maps.

use once_cell::sync::Lazy;
use regex::Regex;

use super::engine::{LineRule, Patcher, Region};
use super::replacements::Replacements;
use super::{go_string, CommandKind, PatchContext};
use crate::error::Result;

/// First assertion against the captured options
const ASSERT_ANCHOR: &str = "Expect(createdOptions";
const ASSERTION: &str = "Expect";
/// Properties the generic options keep as fields
const DIRECT_PROPERTIES: &[&str] = &["createdOptions.ToolchainID)", "createdOptions.ToolID)"];
/// Pulls the parameter map back out of an update payload
const EXTRACT_UPDATE_PARAMETERS: &str =
    "\ttp := createdOptions.ToolchainToolPrototypePatch[\"parameters\"].(*map[string]interface{})";

static PROPERTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Expect\(createdOptions\.(\w+)\)").expect("valid property regex"));
static POINTER_WRAPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^core\.\w+Ptr\((.*)\)$").expect("valid pointer wrapper regex"));

/// Build the patcher for `mock_senders_for_test.go`
pub fn mock_senders_patcher<'a>(ctx: &'a PatchContext<'a>, file: &str) -> Patcher<'a> {
    let package = &ctx.layout.sdk_package;
    let mut replacements = Replacements::new();
    let mut patcher = Patcher::new(file);

    for (formatted, tool_type_id) in ctx.mappings.services() {
        for kind in [CommandKind::Create, CommandKind::Update] {
            let verb = kind.verb();
            replacements.insert(
                format!("{package}.{verb}{formatted}Options"),
                format!("{package}.{verb}ToolOptions"),
            );
            patcher = patcher.with_rule(MockSenderRule {
                ctx,
                kind,
                formatted,
                tool_type_id,
                keyword: format!("{verb}{formatted}MockSender) Send"),
            });
        }
    }

    patcher.with_replacements(replacements)
}

struct MockSenderRule<'a> {
    ctx: &'a PatchContext<'a>,
    kind: CommandKind,
    formatted: &'a str,
    tool_type_id: &'a str,
    keyword: String,
}

impl MockSenderRule<'_> {
    /// Go expression holding the generic parameter map
    fn parameter_source(&self) -> &'static str {
        match self.kind {
            CommandKind::Create => "createdOptions.Parameters",
            CommandKind::Update => "(*tp)",
        }
    }

    fn rewrite_assertion(&self, region: &Region<'_>, line: &str) -> Result<String> {
        if DIRECT_PROPERTIES.iter().any(|direct| line.contains(direct)) {
            return Ok(line.to_string());
        }

        let property = PROPERTY
            .captures(line)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| region.missing("Expect(createdOptions.<Property>)"))?;
        let wire = self
            .ctx
            .mappings
            .wire_for_formatted(self.formatted, &property)
            .ok_or_else(|| region.unresolved(self.tool_type_id, &property))?;
        let expected = expected_value(line).ok_or_else(|| region.missing("To(Equal(...))"))?;

        let indent = &line[..line.find(ASSERTION).unwrap_or(0)];
        Ok(format!(
            "{indent}Expect({}[{}]).To(Equal({expected}))",
            self.parameter_source(),
            go_string(wire)
        ))
    }
}

/// The value inside `To(Equal(...))`, unwrapped from `core.*Ptr(...)`
fn expected_value(line: &str) -> Option<&str> {
    let start = line.find(".To(Equal(")? + ".To(Equal(".len();
    let inner = line[start..].trim_end().strip_suffix("))")?;
    Some(
        POINTER_WRAPPER
            .captures(inner)
            .and_then(|caps| caps.get(1))
            .map_or(inner, |value| value.as_str()),
    )
}

impl LineRule for MockSenderRule<'_> {
    fn keyword(&self) -> &str {
        &self.keyword
    }

    fn context(&self) -> String {
        format!("{} mock sender for service '{}'", self.kind.verb(), self.tool_type_id)
    }

    fn rewrite(&self, region: &mut Region<'_>) -> Result<()> {
        // up to the first assertion on the captured options
        let first = loop {
            let line = region.take().ok_or_else(|| region.missing(ASSERT_ANCHOR))?;
            if line.contains(ASSERT_ANCHOR) {
                break line;
            }
            region.emit(line);
        };

        if self.kind == CommandKind::Update && self.ctx.mappings.has_parameters(self.tool_type_id) {
            region.emit(EXTRACT_UPDATE_PARAMETERS);
        }
        let rewritten = self.rewrite_assertion(region, first)?;
        region.emit(rewritten);

        // the assertion block ends at the first non-assertion line
        while let Some(line) = region.peek() {
            if !line.contains(ASSERTION) {
                break;
            }
            region.take();
            let rewritten = self.rewrite_assertion(region, line)?;
            region.emit(rewritten);
        }
        Ok(())
    }
}
