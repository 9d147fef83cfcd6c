//! Retargets generated create/update commands onto the generic tool calls.
//!
//! Each `Create<Service>CommandRunner) Run` / `Update<Service>CommandRunner) Run`
//! body is rewritten so the flag values land in a `parameters` map instead of
//! service-specific option setters:
//!
//! ```text
//! FlagSet := cmd.Flags()                        FlagSet := cmd.Flags()
//! FlagSet.Visit(func(flag *pflag.Flag) {        parameters := map[string]interface{}{}
//!     if flag.Name == "region" {                FlagSet.Visit(func(flag *pflag.Flag) {
//!         OptionsModel.SetRegion(r.Region)  =>      if flag.Name == "region" {
//!     }                                                 parameters["Region"] = r.Region
//! })                                                }
//!                                               })
//! r.MakeRequest(OptionsModel)                   OptionsModel.SetToolTypeID("my_service")
//!                                               OptionsModel.SetParameters(parameters)
//!                                               r.MakeRequest(OptionsModel)
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::engine::{LineRule, Patcher, Region};
use super::replacements::Replacements;
use super::{go_string, CommandKind, PatchContext};
use crate::error::Result;

/// Where flag values get bound; the parameter maps go right after it
const FLAGS_ANCHOR: &str = "FlagSet := cmd.Flags()";
/// The dispatch call; payload setters go right before it
const DISPATCH_ANCHOR: &str = "r.MakeRequest(OptionsModel)";
const SETTER: &str = "OptionsModel.Set";
/// Setters that stay direct because the generic operations keep them
const DIRECT_SETTERS: &[&str] = &["OptionsModel.SetToolchainID(", "OptionsModel.SetToolID("];

static FLAG_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"flag\.Name == "([^"]+)""#).expect("valid flag name regex"));
static RUNNER_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"r\.(\w+)").expect("valid runner field regex"));

/// Build the patcher for `commands.go`
pub fn commands_patcher<'a>(ctx: &'a PatchContext<'a>, file: &str) -> Patcher<'a> {
    let package = &ctx.layout.sdk_package;
    let mut replacements = Replacements::new();
    let mut patcher = Patcher::new(file);

    for (formatted, tool_type_id) in ctx.mappings.services() {
        for kind in [CommandKind::Create, CommandKind::Update] {
            let verb = kind.verb();
            replacements.insert(
                format!("ServiceInstance.{verb}{formatted}"),
                format!("ServiceInstance.{verb}Tool"),
            );
            replacements.insert(
                format!("{package}.{verb}{formatted}Options"),
                format!("{package}.{verb}ToolOptions"),
            );

            patcher = patcher.with_rule(CommandRunnerRule {
                ctx,
                kind,
                tool_type_id,
                keyword: format!("{verb}{formatted}CommandRunner) Run"),
            });
        }
    }

    patcher.with_replacements(replacements)
}

struct CommandRunnerRule<'a> {
    ctx: &'a PatchContext<'a>,
    kind: CommandKind,
    tool_type_id: &'a str,
    keyword: String,
}

impl CommandRunnerRule<'_> {
    fn has_parameters(&self) -> bool {
        self.ctx.mappings.has_parameters(self.tool_type_id)
    }

    fn needs_parameter_map(&self) -> bool {
        self.has_parameters() || !self.ctx.hardcoded_for(self.tool_type_id).is_empty()
    }

    /// Declarations placed right after the flags anchor
    fn parameter_maps(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let with_map = self.needs_parameter_map();
        if with_map {
            lines.push("\tparameters := map[string]interface{}{}".to_string());
        }
        if self.kind == CommandKind::Update {
            if with_map {
                lines.push("\ttoolPrototypePatch := map[string]interface{}{".to_string());
                lines.push("\t\t\"parameters\": &parameters,".to_string());
                lines.push("\t}".to_string());
            } else {
                // an empty patch body is still required
                lines.push("\ttoolPrototypePatch := map[string]interface{}{}".to_string());
            }
        }
        lines
    }

    /// Payload setters placed right before the dispatch anchor
    fn payload_setters(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .ctx
            .hardcoded_for(self.tool_type_id)
            .iter()
            .map(|(field, value)| format!("\tparameters[{}] = {}", go_string(field), go_string(value)))
            .collect();

        match self.kind {
            CommandKind::Create => {
                lines.push(format!(
                    "\tOptionsModel.SetToolTypeID({})",
                    go_string(self.tool_type_id)
                ));
                if self.needs_parameter_map() {
                    lines.push("\tOptionsModel.SetParameters(parameters)".to_string());
                }
            }
            CommandKind::Update => {
                lines.push("\tOptionsModel.SetToolchainToolPrototypePatch(toolPrototypePatch)".to_string());
            }
        }
        lines
    }

    /// `OptionsModel.SetRegion(r.Region)` -> `parameters["Region"] = r.Region`
    fn rewrite_setter(&self, region: &Region<'_>, line: &str) -> Result<String> {
        let flag = region
            .preceding()
            .and_then(|previous| FLAG_NAME.captures(previous))
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| region.missing("if flag.Name == \"...\""))?;

        let wire = self
            .ctx
            .mappings
            .wire_for_cli(self.tool_type_id, &flag)
            .ok_or_else(|| region.unresolved(self.tool_type_id, &flag))?;

        let setter_at = line.find(SETTER).unwrap_or(0);
        let field = RUNNER_FIELD
            .captures(&line[setter_at..])
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| region.missing("r.<Field>"))?;

        let rewritten = format!("{}parameters[{}] = r.{field}", &line[..setter_at], go_string(wire));
        log::debug!("[line {}] '{}' -> '{}'", region.line_number(), line.trim(), rewritten.trim());
        Ok(rewritten)
    }
}

fn is_parameter_setter(line: &str) -> bool {
    line.contains(SETTER) && !DIRECT_SETTERS.iter().any(|direct| line.contains(direct))
}

impl LineRule for CommandRunnerRule<'_> {
    fn keyword(&self) -> &str {
        &self.keyword
    }

    fn context(&self) -> String {
        format!("{} command for service '{}'", self.kind.verb(), self.tool_type_id)
    }

    fn rewrite(&self, region: &mut Region<'_>) -> Result<()> {
        // up to and including the flags anchor
        loop {
            let line = region.take().ok_or_else(|| region.missing(FLAGS_ANCHOR))?;
            region.emit(line);
            if line.contains(FLAGS_ANCHOR) {
                break;
            }
        }
        region.emit_all(self.parameter_maps());

        // flag bindings, up to the dispatch anchor
        while let Some(line) = region.take() {
            if line.contains(DISPATCH_ANCHOR) {
                region.emit_all(self.payload_setters());
                region.emit(line);
                return Ok(());
            }
            if is_parameter_setter(line) {
                let rewritten = self.rewrite_setter(region, line)?;
                region.emit(rewritten);
            } else {
                region.emit(line);
            }
        }
        Err(region.missing(DISPATCH_ANCHOR))
    }
}
