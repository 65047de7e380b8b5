use crate::error::{FileCollectorError, Result};
use crate::ignore::IgnoreRules;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One persisted ignore pattern, stored as `{ "pattern": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternItem {
    pub pattern: String,
}

impl PatternItem {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

/// Ordered, user-edited pattern list backed by a JSON file.
///
/// Every edit rewrites the whole list; order is significant because later
/// patterns override earlier ones.
pub struct PatternStore {
    path: PathBuf,
    items: Vec<PatternItem>,
}

impl PatternStore {
    /// Open the store, creating an empty `[]` file if none exists yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items: Vec<PatternItem> = load_records(&path)?;
        debug!(path = %path.display(), count = items.len(), "loaded pattern store");
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> &[PatternItem] {
        &self.items
    }

    /// Pattern strings in stored order, ready for compilation.
    pub fn raw_patterns(&self) -> Vec<String> {
        self.items.iter().map(|item| item.pattern.clone()).collect()
    }

    /// Compile the current list for a scan.
    pub fn rules(&self) -> IgnoreRules {
        IgnoreRules::from_patterns(self.items.iter().map(|item| item.pattern.as_str()))
    }

    /// Replace the whole list. Patterns are trimmed, blanks dropped and
    /// duplicates removed (first occurrence wins) before writing.
    pub fn save(&mut self, items: Vec<PatternItem>) -> Result<&[PatternItem]> {
        let cleaned = dedupe(items);
        write_records(&self.path, &cleaned)?;
        self.items = cleaned;
        Ok(&self.items)
    }

    /// Append a pattern. Returns false when it was blank or already present.
    pub fn add(&mut self, pattern: &str) -> Result<bool> {
        if pattern.trim().is_empty() {
            return Ok(false);
        }
        let before = self.items.len();
        let mut updated = self.items.clone();
        updated.push(PatternItem::new(pattern));
        Ok(self.save(updated)?.len() > before)
    }

    /// Replace the pattern at `index`.
    pub fn update(&mut self, index: usize, pattern: &str) -> Result<()> {
        let len = self.items.len();
        let mut updated = self.items.clone();
        let slot = updated
            .get_mut(index)
            .ok_or(FileCollectorError::IndexOutOfRange { index, len })?;
        slot.pattern = pattern.trim().to_string();
        self.save(updated)?;
        Ok(())
    }

    /// Remove and return the pattern at `index`.
    pub fn remove(&mut self, index: usize) -> Result<PatternItem> {
        let len = self.items.len();
        if index >= len {
            return Err(FileCollectorError::IndexOutOfRange { index, len });
        }
        let mut updated = self.items.clone();
        let removed = updated.remove(index);
        self.save(updated)?;
        Ok(removed)
    }

    /// Append every pattern line from `.gitignore` text. Returns how many
    /// new patterns were actually added.
    pub fn import_gitignore(&mut self, content: &str) -> Result<usize> {
        let incoming: Vec<PatternItem> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(PatternItem::new)
            .collect();
        if incoming.is_empty() {
            return Ok(0);
        }

        let before = self.items.len();
        let mut updated = self.items.clone();
        updated.extend(incoming);
        let after = self.save(updated)?.len();
        Ok(after.saturating_sub(before))
    }
}

/// Trim, drop blanks, and remove duplicates keeping first-seen order.
pub fn dedupe(items: Vec<PatternItem>) -> Vec<PatternItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| item.pattern.trim().to_string())
        .filter(|pattern| !pattern.is_empty())
        .filter(|pattern| seen.insert(pattern.clone()))
        .map(PatternItem::new)
        .collect()
}

/// Read a JSON array of records, creating the file as `[]` when missing.
fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FileCollectorError::io(parent, e))?;
        }
        fs::write(path, "[]").map_err(|e| FileCollectorError::io(path, e))?;
        info!(path = %path.display(), "created new store file");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|e| FileCollectorError::io(path, e))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| FileCollectorError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    if !value.is_array() {
        return Err(FileCollectorError::InvalidFormat {
            path: path.to_path_buf(),
        });
    }
    serde_json::from_value(value).map_err(|source| FileCollectorError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let content = serde_json::to_string_pretty(records).map_err(|source| {
        FileCollectorError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, content).map_err(|e| FileCollectorError::io(path, e))
}

/// A named system prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptItem {
    pub id: String,
    pub name: String,
    pub content: String,
}

/// Saved system prompts, kept in insertion order in a JSON file of
/// `{ "id", "name", "content" }` records.
pub struct PromptStore {
    path: PathBuf,
    items: Vec<PromptItem>,
}

impl PromptStore {
    /// Open the store, creating an empty `[]` file if none exists yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items: Vec<PromptItem> = load_records(&path)?;
        debug!(path = %path.display(), count = items.len(), "loaded prompt store");
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> &[PromptItem] {
        &self.items
    }

    /// Look a prompt up by id, falling back to its name.
    pub fn find(&self, key: &str) -> Option<&PromptItem> {
        self.items
            .iter()
            .find(|p| p.id == key)
            .or_else(|| self.items.iter().find(|p| p.name == key))
    }

    fn save(&mut self, items: Vec<PromptItem>) -> Result<()> {
        write_records(&self.path, &items)?;
        self.items = items;
        Ok(())
    }

    /// Add a prompt with a fresh id. Blank names or contents are not saved.
    pub fn add(&mut self, name: &str, content: &str) -> Result<Option<PromptItem>> {
        if name.trim().is_empty() || content.trim().is_empty() {
            return Ok(None);
        }
        let item = PromptItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            content: content.trim().to_string(),
        };
        let mut updated = self.items.clone();
        updated.push(item.clone());
        self.save(updated)?;
        Ok(Some(item))
    }

    /// Replace name and content of the prompt `key` (id or name). Returns
    /// false, leaving the store untouched, when either value is blank.
    pub fn update(&mut self, key: &str, name: &str, content: &str) -> Result<bool> {
        let id = self.resolve_id(key)?;
        if name.trim().is_empty() || content.trim().is_empty() {
            return Ok(false);
        }
        let mut updated = self.items.clone();
        for prompt in updated.iter_mut().filter(|p| p.id == id) {
            prompt.name = name.trim().to_string();
            prompt.content = content.trim().to_string();
        }
        self.save(updated)?;
        Ok(true)
    }

    /// Remove and return the prompt `key` (id or name).
    pub fn remove(&mut self, key: &str) -> Result<PromptItem> {
        let id = self.resolve_id(key)?;
        let (removed, kept): (Vec<PromptItem>, Vec<PromptItem>) =
            self.items.iter().cloned().partition(|p| p.id == id);
        self.save(kept)?;
        removed
            .into_iter()
            .next()
            .ok_or(FileCollectorError::PromptNotFound { key: key.to_string() })
    }

    fn resolve_id(&self, key: &str) -> Result<String> {
        self.find(key)
            .map(|p| p.id.clone())
            .ok_or_else(|| FileCollectorError::PromptNotFound { key: key.to_string() })
    }
}
