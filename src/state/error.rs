//! State management-specific error types.

use crate::utils::literal::ValueKind;

/// Errors that can occur during state operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    /// Key not declared in the state schema
    #[error("Unknown app state key: {key}")]
    UnknownKey { key: String },

    /// Key declared twice in the state schema
    #[error("App state key declared twice: {key}")]
    DuplicateKey { key: String },

    /// Value of the wrong kind for a key
    #[error("App state {key} expects a {expected} value, got {found}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// Value of the right kind but with unusable content
    #[error("Invalid value for app state {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Leaving a context while already at the root list
    #[error("Cannot leave context: context path is empty")]
    ContextPathEmpty,
}
