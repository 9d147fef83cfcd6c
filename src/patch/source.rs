//! Line-oriented view of a generated source file.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Ordered, 0-indexed lines of one file.
///
/// Read once, rebuilt by a patch pass, written once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLines {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl SourceLines {
    pub fn parse(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            body.split('\n').map(str::to_string).collect()
        };
        Self {
            lines,
            trailing_newline,
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::parse(&text))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Swap in the output of a patch pass
    pub(crate) fn replace_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }

    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            text.push('\n');
        }
        text
    }

    /// Write via a sibling temp file and rename, so readers never see a
    /// half-written file
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let temp_path = path.with_extension("patch.tmp");
        fs::write(&temp_path, self.render()).map_err(|e| Error::io(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;
        log::info!("Overwrote file: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_and_render_preserve_text() {
        for text in ["package main\n\nfunc main() {}\n", "no newline", "", "a\r\nb\n"] {
            assert_eq!(SourceLines::parse(text).render(), text);
        }
    }

    #[test]
    fn lines_are_split_on_newlines() {
        let source = SourceLines::parse("one\ntwo\n\nfour\n");
        assert_eq!(source.lines(), ["one", "two", "", "four"]);
        assert_eq!(source.len(), 4);
        assert!(SourceLines::parse("").is_empty());
    }

    #[test]
    fn write_atomic_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("commands.go");
        fs::write(&path, "old\n").unwrap();

        let mut source = SourceLines::read(&path).unwrap();
        source.replace_lines(vec!["new".into(), "content".into()]);
        source.write_atomic(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new\ncontent\n");
        assert!(!path.with_extension("patch.tmp").exists());
    }

    #[test]
    fn read_missing_file_names_path() {
        let err = SourceLines::read(Path::new("/nonexistent/commands.go")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/commands.go"));
    }
}
