//! Error types for result-file I/O

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or caching statistics
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to open {}: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid format in {}: {message}", path.display())]
    InvalidFormat { path: PathBuf, message: String },

    #[error("Observable '{observable}' not found in {}", path.display())]
    ObservableNotFound { observable: String, path: PathBuf },

    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Pickle error: {0}")]
    Pickle(#[from] serde_pickle::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    pub(crate) fn open(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound(path.to_path_buf())
        } else {
            IoError::OpenFailed {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Result type for I/O operations
pub type IoResult<T> = Result<T, IoError>;
