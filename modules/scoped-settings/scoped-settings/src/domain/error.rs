use scoped_settings_sdk::{ScopedSettingsError, StorageType};
use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unsupported value type: {kind}")]
    UnsupportedValueType { kind: String },

    #[error("Type mismatch for '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: StorageType,
        actual: String,
    },

    #[error("Storage type is not defined for '{path}'")]
    StorageTypeUndefined { path: String },

    #[error("Corrupt setting record {id:?}: {reason}")]
    CorruptRecord { id: Option<i64>, reason: String },

    #[error("Setting '{path}' is not defined for scope ({scope})")]
    SettingUndefined { path: String, scope: String },

    #[error("A setting already exists for '{key}' with scope ({scope})")]
    DuplicateScope { key: String, scope: String },

    #[error("Unknown settings alias '{alias}'")]
    UnknownAlias { alias: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    pub fn unsupported_value_type(kind: impl Into<String>) -> Self {
        Self::UnsupportedValueType { kind: kind.into() }
    }

    pub fn type_mismatch(
        path: impl Into<String>,
        expected: StorageType,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected,
            actual: actual.into(),
        }
    }

    pub fn storage_type_undefined(path: impl Into<String>) -> Self {
        Self::StorageTypeUndefined { path: path.into() }
    }

    pub fn corrupt_record(id: Option<i64>, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            id,
            reason: reason.into(),
        }
    }

    pub fn setting_undefined(path: impl Into<String>, scope: impl ToString) -> Self {
        Self::SettingUndefined {
            path: path.into(),
            scope: scope.to_string(),
        }
    }

    pub fn duplicate_scope(key: impl ToString, scope: impl ToString) -> Self {
        Self::DuplicateScope {
            key: key.to_string(),
            scope: scope.to_string(),
        }
    }

    pub fn unknown_alias(alias: impl Into<String>) -> Self {
        Self::UnknownAlias {
            alias: alias.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Integrity errors are defects in stored data, never caller mistakes.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::CorruptRecord { .. } | Self::DuplicateScope { .. })
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for ScopedSettingsError {
    fn from(e: DomainError) -> Self {
        let message = e.to_string();
        match e {
            DomainError::SettingUndefined { .. } | DomainError::UnknownAlias { .. } => {
                Self::not_found(message)
            }
            DomainError::DuplicateScope { .. } => Self::conflict(message),
            DomainError::TypeMismatch { .. } | DomainError::UnsupportedValueType { .. } => {
                Self::type_mismatch(message)
            }
            DomainError::Validation { .. } => Self::validation(message),
            DomainError::CorruptRecord { .. } | DomainError::StorageTypeUndefined { .. } => {
                Self::integrity(message)
            }
            DomainError::Storage(_) => Self::internal(),
        }
    }
}
