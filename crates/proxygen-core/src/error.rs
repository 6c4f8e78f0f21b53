//! Centralized error types for class loading and reflection.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for proxygen core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Class {name} not found in files {files}")]
    ClassNotFound { name: String, files: String },

    #[error("Extension not found: {name} (searched {searched})")]
    ExtensionNotFound { name: String, searched: String },

    #[error("Cannot expand ext:{0}: no stub directory configured (use --stubs or PROXYGEN_STUBS)")]
    StubsNotConfigured(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PHP grammar error: {0}")]
    Grammar(String),
}

/// Result type for proxygen core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a class not found error for the given file list.
    pub fn class_not_found(name: impl Into<String>, files: impl Into<String>) -> Self {
        Self::ClassNotFound {
            name: name.into(),
            files: files.into(),
        }
    }

    /// Wrap an I/O failure with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
