use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Research record not found: {0}")]
    NotFound(String),

    #[error("Research record already exists: {0}")]
    DuplicateId(String),

    #[error("Invalid research record: {0}")]
    InvalidRecord(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Write {
            path: path.into(),
            source,
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Read {
            path: path.into(),
            source,
        }
    }
}
