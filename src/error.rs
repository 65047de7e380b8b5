use std::path::PathBuf;

/// FileCollector error types.
///
/// The ignore engine itself never fails. These cover pattern storage and
/// directory scanning.
#[derive(Debug, thiserror::Error)]
pub enum FileCollectorError {
    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Store content is not valid JSON for the expected shape
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Store file holds something other than a list of records
    #[error("Invalid data format in {}: expected an array", .path.display())]
    InvalidFormat { path: PathBuf },
    /// Index-based edit outside the current list
    #[error("Pattern index {index} out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
    /// Scan root exists but is not a directory
    #[error("Not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },
    /// No saved system prompt has this id or name
    #[error("No system prompt with id or name \"{key}\"")]
    PromptNotFound { key: String },
}

pub type Result<T> = std::result::Result<T, FileCollectorError>;

impl FileCollectorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
