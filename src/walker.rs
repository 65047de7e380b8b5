use crate::error::{FileCollectorError, Result};
use crate::ignore::{normalize_path, IgnoreRules};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{info, trace, warn};
use walkdir::WalkDir;

/// A kept file or directory in the scanned tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub label: String,
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// `/`-separated path relative to the scan root.
    pub relative: String,
    /// `Some` for directories, `None` for files.
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    pub fn is_dir(&self) -> bool {
        self.children.is_some()
    }
}

/// A file surfaced by [`flatten_files`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub label: String,
    pub path: PathBuf,
    pub relative: String,
}

/// Walk `root` and return the kept entries as a tree.
///
/// Ignored directories are pruned before descent. Symbolic links are
/// followed, so a linked directory appears as a directory under the link
/// name. Directories left without any kept file are dropped. Siblings list
/// directories first, then sort by label.
pub fn scan_tree(root: &Path, rules: &IgnoreRules) -> Result<Vec<TreeNode>> {
    let meta = std::fs::metadata(root).map_err(|e| FileCollectorError::io(root, e))?;
    if !meta.is_dir() {
        return Err(FileCollectorError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    // Symlinked directories are walked like real ones; link cycles surface as
    // walk errors and are skipped below.
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let ignored = rules.is_ignored_path(relative, entry.file_type().is_dir());
            if ignored {
                trace!(path = %relative.display(), "ignored");
            }
            !ignored
        });

    // Pre-order stream: each open directory waits on the stack for its children.
    let mut roots: Vec<TreeNode> = Vec::new();
    let mut stack: Vec<(usize, TreeNode)> = Vec::new();
    let mut files = 0usize;

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let depth = entry.depth();
        close_until(&mut stack, &mut roots, depth);

        let relative = normalize_path(entry.path().strip_prefix(root).unwrap_or(entry.path()));
        let node = TreeNode {
            label: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path().to_path_buf(),
            relative,
            children: entry.file_type().is_dir().then(Vec::new),
        };

        if node.is_dir() {
            stack.push((depth, node));
        } else {
            files += 1;
            attach(&mut stack, &mut roots, node);
        }
    }
    close_until(&mut stack, &mut roots, 0);

    sort_nodes(&mut roots);
    info!(root = %root.display(), files, "scan complete");
    Ok(roots)
}

/// Pop every open directory at `depth` or deeper, attaching non-empty ones.
fn close_until(stack: &mut Vec<(usize, TreeNode)>, roots: &mut Vec<TreeNode>, depth: usize) {
    while stack.last().is_some_and(|(d, _)| *d >= depth) {
        if let Some((_, dir)) = stack.pop() {
            if dir.children.as_ref().is_some_and(|c| !c.is_empty()) {
                attach(stack, roots, dir);
            }
        }
    }
}

fn attach(stack: &mut [(usize, TreeNode)], roots: &mut Vec<TreeNode>, node: TreeNode) {
    match stack.last_mut().and_then(|(_, parent)| parent.children.as_mut()) {
        Some(children) => children.push(node),
        None => roots.push(node),
    }
}

fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.label.cmp(&b.label),
    });
    for node in nodes.iter_mut() {
        if let Some(children) = node.children.as_mut() {
            sort_nodes(children);
        }
    }
}

/// Collect every file in the tree, sorted by label.
pub fn flatten_files(nodes: &[TreeNode]) -> Vec<FileEntry> {
    fn collect(nodes: &[TreeNode], out: &mut Vec<FileEntry>) {
        for node in nodes {
            match &node.children {
                Some(children) => collect(children, out),
                None => out.push(FileEntry {
                    label: node.label.clone(),
                    path: node.path.clone(),
                    relative: node.relative.clone(),
                }),
            }
        }
    }

    let mut files = Vec::new();
    collect(nodes, &mut files);
    files.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.relative.cmp(&b.relative)));
    files
}

/// Case-insensitive substring search over root-relative file paths. A blank
/// query matches nothing.
pub fn search_files<'a>(files: &'a [FileEntry], query: &str) -> Vec<&'a FileEntry> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    files
        .iter()
        .filter(|f| f.relative.to_lowercase().contains(&needle))
        .collect()
}
