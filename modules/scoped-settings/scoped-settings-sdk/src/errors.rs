//! Public error types for the `scoped-settings` module.
//!
//! These errors are safe to expose to other modules and consumers.

use thiserror::Error;

/// Errors that can be returned by the `ScopedSettingsApi`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopedSettingsError {
    /// Nothing resolved for the requested setting, or the alias is unknown.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// A record already exists for the requested scope.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The value's type disagrees with the declared or established storage type.
    #[error("Type mismatch: {message}")]
    TypeMismatch { message: String },

    /// Validation error with the provided data.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Stored data violates a record invariant.
    #[error("Integrity error: {message}")]
    Integrity { message: String },

    /// An internal error occurred.
    #[error("Internal error")]
    Internal,
}

impl ScopedSettingsError {
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::Internal
    }
}
