//! Shopping list-specific error types.

use std::path::PathBuf;

/// Errors that can occur during shopping list operations.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    /// Context path does not address a list
    #[error("No list at context path {path:?}")]
    PathNotFound { path: Vec<String> },

    /// Item missing in the addressed list
    #[error("Item not found: {id}")]
    ItemNotFound { id: String },

    /// Failed to read the data file
    #[error("Failed to load lists from {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the data file or its backup
    #[error("Failed to save lists to {path}: {source}")]
    SaveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create the data directory
    #[error("Failed to create data directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize the lists
    #[error("Failed to serialize lists: {0}")]
    SerializationFailed(String),
}
