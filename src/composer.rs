use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::warn;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Files longer than this many characters are left out of the prompt.
pub const MAX_FILE_SIZE: usize = 200_000;

/// Word runs (ASCII word characters) or any single other non-space character.
const TOKEN_PATTERN: &str = r"[A-Za-z0-9_]+|[^\sA-Za-z0-9_]";

#[allow(clippy::expect_used)]
static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN_PATTERN).expect("valid regex pattern"));

/// A selected file after reading it from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub path: PathBuf,
    /// Fence language tag, taken from the lowercase file extension.
    pub language: String,
    pub content: String,
    pub error: Option<String>,
    pub tokens: usize,
}

impl LoadedFile {
    fn read(path: &Path) -> Self {
        let language = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match fs::read_to_string(path) {
            Ok(content) if content.chars().count() > MAX_FILE_SIZE => {
                warn!(path = %path.display(), "selected file too large, skipping");
                Self {
                    path: path.to_path_buf(),
                    language,
                    content: String::new(),
                    error: Some(format!(
                        "File is too large to display (over {}k characters).",
                        MAX_FILE_SIZE / 1000
                    )),
                    tokens: 0,
                }
            }
            Ok(content) => Self {
                path: path.to_path_buf(),
                language,
                tokens: estimate_tokens(&content),
                content,
                error: None,
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read selected file");
                Self {
                    path: path.to_path_buf(),
                    language,
                    content: String::new(),
                    error: Some(err.to_string()),
                    tokens: 0,
                }
            }
        }
    }
}

/// Read all selected files in parallel, largest token count first.
pub fn read_files(paths: &[PathBuf]) -> Vec<LoadedFile> {
    let mut files: Vec<LoadedFile> = paths.par_iter().map(|p| LoadedFile::read(p)).collect();
    files.sort_by(|a, b| b.tokens.cmp(&a.tokens));
    files
}

/// Assemble the prompt: system prompt, then each readable file in a fenced
/// block, then the user prompt. Blank parts are left out.
pub fn compose(files: &[LoadedFile], system_prompt: &str, user_prompt: &str) -> String {
    let file_sections: Vec<String> = files
        .iter()
        .filter(|f| f.error.is_none() && !f.content.is_empty())
        .map(|f| {
            format!(
                "FILE PATH: {}\n\nCONTENT:\n```{}\n{}\n```",
                f.path.display(),
                f.language,
                f.content
            )
        })
        .collect();
    let file_content = file_sections.join(SECTION_SEPARATOR);

    let mut parts = Vec::with_capacity(3);
    if !system_prompt.trim().is_empty() {
        parts.push(format!("SYSTEM PROMPT:\n\n{}", system_prompt.trim()));
    }
    if !file_content.trim().is_empty() {
        parts.push(file_content);
    }
    if !user_prompt.trim().is_empty() {
        parts.push(format!("USER PROMPT:\n\n{}", user_prompt.trim()));
    }
    parts.join(SECTION_SEPARATOR)
}

/// Rough token count: each run of ASCII word characters is one token, as is
/// every other non-whitespace character.
pub fn estimate_tokens(text: &str) -> usize {
    TOKEN_REGEX.find_iter(text).count()
}
