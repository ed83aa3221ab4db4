//! Configuration-specific error types.

use std::path::PathBuf;

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No config file is layered into the store
    #[error("No configuration file registered")]
    NoConfigFile,

    /// Failed to find the platform config directory
    #[error("Failed to find config directory")]
    ConfigDirectoryNotFound,

    /// Backing file vanished before a write
    #[error("Configuration file {path} not found")]
    FileNotFound { path: PathBuf },

    /// Failed to load configuration file
    #[error("Failed to load configuration from {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to save configuration file
    #[error("Failed to save configuration to {path}: {source}")]
    SaveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create configuration directory
    #[error("Failed to create configuration directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}
