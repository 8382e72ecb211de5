//! Error Types
//!
//! Storage errors come from the key-value layer; application errors are what
//! the action functions and the editor surface to their callers.

use thiserror::Error;

/// Key-value storage errors
///
/// Read-side parse failures never show up here: the storage functions treat
/// an unparsable entry exactly like a missing one.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Write rejected because the store would grow past its quota
    #[error("Storage quota exceeded writing '{key}': need {needed} bytes, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    /// Value could not be serialized for writing
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure in a directory-backed store
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Create a quota exceeded error
    pub fn quota_exceeded(key: impl Into<String>, needed: usize, available: usize) -> Self {
        Self::QuotaExceeded {
            key: key.into(),
            needed,
            available,
        }
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested project id is not in storage
    #[error("Project not found: {id}")]
    ProjectNotFound { id: String },

    /// Storage layer failure
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    /// User input rejected before touching storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// Imported document does not have the project shape
    #[error("Import failed: {0}")]
    Import(String),

    /// Editor referenced a node that is not in the working graph
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },
}

impl AppError {
    /// Create a project not found error
    pub fn project_not_found(id: impl Into<String>) -> Self {
        Self::ProjectNotFound { id: id.into() }
    }

    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an import error
    pub fn import(msg: impl Into<String>) -> Self {
        Self::Import(msg.into())
    }
}

/// Saved markdown file errors
#[derive(Error, Debug)]
pub enum MarkdownFileError {
    #[error("File name already exists: {name}")]
    DuplicateName { name: String },

    #[error("File not found: {id}")]
    NotFound { id: String },

    #[error("File name cannot be empty")]
    EmptyName,

    #[error("Invalid import data: {0}")]
    InvalidImport(String),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
