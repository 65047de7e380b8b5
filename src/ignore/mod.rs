pub mod evaluator;
pub mod pattern;

pub use evaluator::{is_ignored, last_match, should_ignore};
pub use pattern::{compile, compile_all, CompiledPattern, Matcher};

use std::path::{Component, Path};
use tracing::{debug, warn};

/// Compiled, read-only ignore rules for one directory scan.
///
/// Build once per scan and share freely; queries never mutate the set.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<CompiledPattern>,
}

impl IgnoreRules {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile an ordered list of raw pattern strings.
    pub fn from_patterns<I, S>(raws: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = compile_all(raws);
        debug!(count = patterns.len(), "compiled ignore patterns");
        Self { patterns }
    }

    /// Parse rules from ignore-file text, one pattern per line.
    pub fn parse(content: &str) -> Self {
        Self::from_patterns(content.lines())
    }

    /// Load rules from a `.gitignore`-style file. A missing or unreadable file
    /// yields an empty rule set.
    pub fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignore file not readable");
                Self::empty()
            }
        }
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns true if the `/`-separated relative path should be ignored.
    /// Directory queries carry a trailing `/`.
    pub fn is_ignored(&self, path: &str) -> bool {
        is_ignored(&self.patterns, path)
    }

    /// Same as [`IgnoreRules::is_ignored`] for a host path relative to the scan root.
    pub fn is_ignored_path(&self, path: &Path, is_dir: bool) -> bool {
        let mut query = normalize_path(path);
        if is_dir && !query.is_empty() {
            query.push('/');
        }
        is_ignored(&self.patterns, &query)
    }
}

/// Render a relative host path with `/` separators, dropping `.` components.
pub fn normalize_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}
