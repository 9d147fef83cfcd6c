//! Exact-substring replacement with a longest-match-first rule.
//!
//! Targets are tried longest first at every position of a line, so a shorter
//! target that is a prefix of a longer one (`ServiceInstance.CreateGit` vs
//! `ServiceInstance.CreateGithub`) never fires inside the longer match.
//! Replaced text is not scanned again.

/// Ordered set of `target -> replacement` pairs.
#[derive(Debug, Clone, Default)]
pub struct Replacements {
    /// Sorted by descending target length, then lexicographically
    entries: Vec<(String, String)>,
}

impl Replacements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair; the first replacement registered for a target wins
    pub fn insert(&mut self, target: impl Into<String>, replacement: impl Into<String>) {
        let target = target.into();
        if target.is_empty() {
            return;
        }
        if let Some((_, existing)) = self.entries.iter().find(|(t, _)| *t == target) {
            log::warn!("Ignoring duplicate replacement for '{target}' (keeping '{existing}')");
            return;
        }

        let position = self
            .entries
            .iter()
            .position(|(t, _)| {
                t.len() < target.len() || (t.len() == target.len() && t.as_str() > target.as_str())
            })
            .unwrap_or(self.entries.len());
        self.entries.insert(position, (target, replacement.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Targets in the order they are tried
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(target, _)| target.as_str())
    }

    /// Replace every occurrence in one line; `None` when nothing matched
    pub fn apply_line(&self, line: &str) -> Option<(String, Vec<&str>)> {
        let mut out = String::with_capacity(line.len());
        let mut hits = Vec::new();
        let mut rest = line;

        'scan: while !rest.is_empty() {
            for (target, replacement) in &self.entries {
                if rest.starts_with(target.as_str()) {
                    out.push_str(replacement);
                    hits.push(target.as_str());
                    rest = &rest[target.len()..];
                    continue 'scan;
                }
            }
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                out.push(ch);
            }
            rest = chars.as_str();
        }

        if hits.is_empty() { None } else { Some((out, hits)) }
    }

    /// Apply to every line, logging each change; returns the number of
    /// replacements made
    pub fn apply_all(&self, lines: &mut [String]) -> usize {
        if self.entries.is_empty() {
            return 0;
        }

        let mut count = 0;
        for (index, line) in lines.iter_mut().enumerate() {
            let Some((replaced, hits)) = self.apply_line(line) else {
                continue;
            };
            for target in &hits {
                log::debug!(
                    "[line {}] Replaced '{target}' with '{}'",
                    index + 1,
                    self.replacement_for(target).unwrap_or_default()
                );
            }
            count += hits.len();
            *line = replaced;
        }
        count
    }

    /// Targets that appear nowhere in `lines`
    pub fn unmatched<'a>(&'a self, lines: &[String]) -> Vec<&'a str> {
        self.targets()
            .filter(|target| !lines.iter().any(|line| line.contains(target)))
            .collect()
    }

    fn replacement_for(&self, target: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, r)| r.as_str())
    }
}
