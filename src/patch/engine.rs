//! Anchor-scan-and-splice engine.
//!
//! A [`Patcher`] walks a [`SourceLines`] once. When a line contains a rule's
//! keyword, the rule takes over with a [`Region`]: a cursor over the lines
//! that follow, bounded by the next top-level function or the end of file.
//! The rule copies, rewrites and inserts lines into a fresh output sequence,
//! so indices in the input never drift. Afterwards the [`Replacements`] run
//! over the whole output and the file is stamped with [`PATCH_MARKER`].

use super::replacements::Replacements;
use super::source::SourceLines;
use crate::error::{Error, Result};

/// First line of every patched file
pub const PATCH_MARKER: &str = "// Patched by toolchain-cli-gen. Regenerate this file before patching it again.";

/// A keyword-triggered edit of one function.
pub trait LineRule {
    /// Substring that identifies the function's first line
    fn keyword(&self) -> &str;

    /// Human-readable description used in errors
    fn context(&self) -> String;

    /// Rewrite the function body following the keyword line
    fn rewrite(&self, region: &mut Region<'_>) -> Result<()>;
}

/// Cursor over the lines following a keyword match.
///
/// Lines taken from the cursor are not copied automatically; the rule emits
/// whatever should end up in the output.
pub struct Region<'a> {
    file: &'a str,
    context: String,
    input: &'a [String],
    position: usize,
    out: &'a mut Vec<String>,
}

impl<'a> Region<'a> {
    /// Next line inside the region, without consuming it
    pub fn peek(&self) -> Option<&'a str> {
        let line = self.input.get(self.position)?;
        if is_function_start(line) {
            return None;
        }
        Some(line.as_str())
    }

    /// Take the next line inside the region
    pub fn take(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.position += 1;
        Some(line)
    }

    /// Input line just before the most recently taken one
    pub fn preceding(&self) -> Option<&'a str> {
        let index = self.position.checked_sub(2)?;
        self.input.get(index).map(String::as_str)
    }

    /// 1-based input line number of the most recently taken line
    pub fn line_number(&self) -> usize {
        self.position
    }

    pub fn emit(&mut self, line: impl Into<String>) {
        self.out.push(line.into());
    }

    pub fn emit_all<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.out.extend(lines.into_iter().map(Into::into));
    }

    pub fn file(&self) -> &str {
        self.file
    }

    /// Error for an anchor the region never reached
    pub fn missing(&self, anchor: &str) -> Error {
        Error::AnchorNotFound {
            file: self.file.to_string(),
            context: self.context.clone(),
            anchor: anchor.to_string(),
        }
    }

    /// Error for a name the mapping tables cannot resolve
    pub fn unresolved(&self, service: &str, name: &str) -> Error {
        Error::UnresolvedName {
            file: self.file.to_string(),
            service: service.to_string(),
            name: name.to_string(),
            line: self.line_number(),
        }
    }
}

/// Top-level Go function declarations bound every region
fn is_function_start(line: &str) -> bool {
    line.starts_with("func ")
}

/// Outcome of one patch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub functions: usize,
    pub replacements: usize,
}

/// Keyword rules plus a global replacement pass for one file.
pub struct Patcher<'r> {
    file: String,
    rules: Vec<Box<dyn LineRule + 'r>>,
    replacements: Replacements,
}

impl<'r> Patcher<'r> {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            rules: Vec::new(),
            replacements: Replacements::new(),
        }
    }

    pub fn with_rule(mut self, rule: impl LineRule + 'r) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn with_replacements(mut self, replacements: Replacements) -> Self {
        self.replacements = replacements;
        self
    }

    pub fn replacements(&self) -> &Replacements {
        &self.replacements
    }

    /// Patch `source` in memory.
    ///
    /// On error `source` is left exactly as it was.
    pub fn apply(&self, source: &mut SourceLines) -> Result<PatchReport> {
        if source.lines().iter().any(|line| line.contains(PATCH_MARKER)) {
            return Err(Error::AlreadyPatched {
                file: self.file.clone(),
            });
        }

        log::info!("Making modifications to {}", self.file);

        let input = source.lines();
        let mut out = Vec::with_capacity(input.len() + input.len() / 4);
        let mut hits = vec![0usize; self.rules.len()];
        let mut index = 0;

        while index < input.len() {
            let line = &input[index];
            out.push(line.clone());
            index += 1;

            let Some(rule_index) = self.matching_rule(line) else {
                continue;
            };
            let rule = &self.rules[rule_index];
            log::debug!(
                "[line {index}] Found function '... {} ...', making changes to the function",
                rule.keyword()
            );

            let mut region = Region {
                file: &self.file,
                context: rule.context(),
                input,
                position: index,
                out: &mut out,
            };
            rule.rewrite(&mut region)?;
            index = region.position;
            hits[rule_index] += 1;
        }

        if let Some(unmatched) = hits.iter().position(|&count| count == 0) {
            let rule = &self.rules[unmatched];
            return Err(Error::AnchorNotFound {
                file: self.file.clone(),
                context: rule.context(),
                anchor: rule.keyword().to_string(),
            });
        }

        let replacements = self.replacements.apply_all(&mut out);
        out.insert(0, PATCH_MARKER.to_string());

        source.replace_lines(out);
        Ok(PatchReport {
            functions: hits.iter().sum(),
            replacements,
        })
    }

    /// The rule with the longest keyword contained in `line`
    fn matching_rule(&self, line: &str) -> Option<usize> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| line.contains(rule.keyword()))
            .max_by_key(|(_, rule)| rule.keyword().len())
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inserts a line after the first `BEGIN` and stops at `END`
    struct Marker {
        keyword: String,
    }

    impl LineRule for Marker {
        fn keyword(&self) -> &str {
            &self.keyword
        }

        fn context(&self) -> String {
            format!("marker {}", self.keyword)
        }

        fn rewrite(&self, region: &mut Region<'_>) -> Result<()> {
            while let Some(line) = region.take() {
                region.emit(line);
                if line.contains("BEGIN") {
                    region.emit(format!("\tinserted by {}", self.keyword));
                }
                if line.contains("END") {
                    return Ok(());
                }
            }
            Err(region.missing("END"))
        }
    }

    fn marker(keyword: &str) -> Marker {
        Marker {
            keyword: keyword.to_string(),
        }
    }

    const SOURCE: &str = "package x\n\
func (r *A) Run() {\n\
\tBEGIN\n\
\tbody a\n\
\tEND\n\
}\n\
\n\
func (r *B) Run() {\n\
\tBEGIN\n\
\tEND\n\
}\n";

    #[test]
    fn rules_splice_and_marker_is_stamped() {
        let mut source = SourceLines::parse(SOURCE);
        let report = Patcher::new("x.go")
            .with_rule(marker("*A) Run"))
            .with_rule(marker("*B) Run"))
            .apply(&mut source)
            .unwrap();

        assert_eq!(report.functions, 2);
        let lines = source.lines();
        assert_eq!(lines[0], PATCH_MARKER);
        assert_eq!(lines[3], "\tBEGIN");
        assert_eq!(lines[4], "\tinserted by *A) Run");
        assert_eq!(lines[5], "\tbody a");
        assert_eq!(lines[10], "\tBEGIN");
        assert_eq!(lines[11], "\tinserted by *B) Run");
        assert_eq!(lines.len(), SourceLines::parse(SOURCE).len() + 3);
    }

    #[test]
    fn second_run_is_rejected() {
        let mut source = SourceLines::parse(SOURCE);
        let patcher = Patcher::new("x.go").with_rule(marker("*A) Run"));
        patcher.apply(&mut source).unwrap();
        let patched = source.clone();

        let err = patcher.apply(&mut source).unwrap_err();
        assert!(matches!(err, Error::AlreadyPatched { ref file } if file == "x.go"));
        assert_eq!(source, patched);
    }

    #[test]
    fn missing_keyword_is_fatal() {
        let mut source = SourceLines::parse(SOURCE);
        let original = source.clone();
        let err = Patcher::new("x.go")
            .with_rule(marker("*C) Run"))
            .apply(&mut source)
            .unwrap_err();
        match err {
            Error::AnchorNotFound { file, context, anchor } => {
                assert_eq!(file, "x.go");
                assert_eq!(context, "marker *C) Run");
                assert_eq!(anchor, "*C) Run");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(source, original);
    }

    #[test]
    fn region_stops_at_next_function() {
        let text = "func (r *A) Run() {\n\tBEGIN\n}\n\nfunc (r *B) Run() {\n\tEND\n}\n";
        let mut source = SourceLines::parse(text);
        let err = Patcher::new("x.go")
            .with_rule(marker("*A) Run"))
            .apply(&mut source)
            .unwrap_err();
        assert!(matches!(err, Error::AnchorNotFound { ref anchor, .. } if anchor == "END"));
        assert_eq!(source.render(), text);
    }

    #[test]
    fn replacements_cover_inserted_lines() {
        let mut replacements = Replacements::new();
        replacements.insert("inserted", "spliced");
        let mut source = SourceLines::parse(SOURCE);
        let report = Patcher::new("x.go")
            .with_rule(marker("*A) Run"))
            .with_replacements(replacements)
            .apply(&mut source)
            .unwrap();
        assert_eq!(report.replacements, 1);
        assert!(source.lines().iter().any(|l| l == "\tspliced by *A) Run"));
    }

    #[test]
    fn replacement_only_pass() {
        let mut replacements = Replacements::new();
        replacements.insert("body a", "body b");
        let mut source = SourceLines::parse(SOURCE);
        let report = Patcher::new("x.go")
            .with_replacements(replacements)
            .apply(&mut source)
            .unwrap();
        assert_eq!(report, PatchReport { functions: 0, replacements: 1 });
        assert_eq!(source.lines()[4], "\tbody b");
    }

    #[test]
    fn longest_keyword_wins() {
        let text = "func (r *UpdateGitCommandRunner) Run() {\n\tBEGIN\n\tEND\n}\n";
        let mut source = SourceLines::parse(text);
        let report = Patcher::new("x.go")
            .with_rule(marker("UpdateGitCommandRunner) Run"))
            .with_rule(marker("GitCommandRunner) Run"))
            .apply(&mut source);
        // the shorter keyword never gets a line of its own
        assert!(matches!(
            report,
            Err(Error::AnchorNotFound { ref anchor, .. }) if anchor == "GitCommandRunner) Run"
        ));
    }
}
