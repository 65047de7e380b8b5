use super::pattern::{compile_all, CompiledPattern};

/// The last rule in list order that accepts `path`.
pub fn last_match<'a>(patterns: &'a [CompiledPattern], path: &str) -> Option<&'a CompiledPattern> {
    patterns.iter().rev().find(|p| p.matches(path))
}

/// Decide whether `path` (relative, `/`-separated, trailing `/` for directories)
/// is excluded by the ordered rule list.
///
/// Later rules override earlier ones. A negated rule only re-includes a path
/// when none of its ancestor directories is itself excluded.
pub fn is_ignored(patterns: &[CompiledPattern], path: &str) -> bool {
    match last_match(patterns, path) {
        None => false,
        Some(rule) if !rule.is_negated() => true,
        Some(_) => has_excluded_ancestor(patterns, path),
    }
}

/// Convenience form of [`is_ignored`] that compiles the raw list first.
///
/// Scans that test many paths should compile once and call [`is_ignored`].
pub fn should_ignore<S: AsRef<str>>(raw_patterns: &[S], path: &str) -> bool {
    let patterns = compile_all(raw_patterns);
    is_ignored(&patterns, path)
}

fn has_excluded_ancestor(patterns: &[CompiledPattern], path: &str) -> bool {
    let mut parent = path.strip_suffix('/').unwrap_or(path);
    let mut dir = String::with_capacity(parent.len() + 1);

    while let Some(idx) = parent.rfind('/') {
        parent = &parent[..idx];
        if parent.is_empty() {
            break;
        }

        dir.clear();
        dir.push_str(parent);
        dir.push('/');
        if last_match(patterns, &dir).is_some_and(|rule| !rule.is_negated()) {
            return true;
        }
    }

    false
}
