use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the pattern store file.
pub const PATTERNS_ENV: &str = "FILECOLLECTOR_GITIGNORE_PATH";
/// Environment variable naming the system prompt store file.
pub const PROMPTS_ENV: &str = "FILECOLLECTOR_SYSTEM_PROMPTS_PATH";
/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "FILECOLLECTOR_LOG";
pub const DEFAULT_LOG_FILTER: &str = "filecollector=info";

const APP_DIR: &str = ".filecollector";
const PATTERNS_FILE: &str = "gitignores.json";
const PROMPTS_FILE: &str = "system_prompts.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub patterns_path: PathBuf,
    pub prompts_path: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Resolve the effective configuration. Explicit values (flag or env,
    /// already merged by the CLI layer) win over defaults.
    pub fn resolve(
        patterns_path: Option<PathBuf>,
        prompts_path: Option<PathBuf>,
        log_filter: Option<String>,
    ) -> Result<Self> {
        let patterns_path = match patterns_path {
            Some(path) => path,
            None => patterns_path_in(&Self::home_dir()?),
        };
        let prompts_path = match prompts_path {
            Some(path) => path,
            None => prompts_path_in(&Self::home_dir()?),
        };
        Ok(Self {
            patterns_path,
            prompts_path,
            log_filter: log_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    fn home_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("HOME environment variable not set")?;
        Ok(PathBuf::from(home))
    }
}

/// Default pattern store location under a home directory.
pub fn patterns_path_in(home: &Path) -> PathBuf {
    home.join(APP_DIR).join(PATTERNS_FILE)
}

pub fn prompts_path_in(home: &Path) -> PathBuf {
    home.join(APP_DIR).join(PROMPTS_FILE)
}
