use async_trait::async_trait;
use scoped_settings_sdk::{ScopeKey, SettingScope, StorageType};

use super::error::DomainError;
use super::record::SettingRecord;

/// Port for the domain layer: persistence operations the settings facade needs.
///
/// Implementations must enforce scope uniqueness on
/// (vendor, plugin, path, channel, locale), treating a missing channel or locale
/// as a value of its own, and report violations as `DuplicateScope`.
///
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait SettingRepository: Send + Sync {
    /// All records sharing `key`, whatever their channel and locale.
    async fn find_by_scope_prefix(&self, key: &ScopeKey)
    -> Result<Vec<SettingRecord>, DomainError>;

    /// The record stored for exactly `key` and `scope`, if any.
    async fn find_one(
        &self,
        key: &ScopeKey,
        scope: &SettingScope,
    ) -> Result<Option<SettingRecord>, DomainError>;

    /// Insert a record without id, or update the record with the same id.
    /// Returns the stored record with its id.
    ///
    /// Atomically with the write, the record's storage type becomes the path's
    /// type when none is established yet. A record whose type differs from the
    /// established one is rejected with `TypeMismatch` and nothing is written.
    async fn save(&self, record: SettingRecord) -> Result<SettingRecord, DomainError>;

    /// Delete a persisted record. Returns true if a row was deleted.
    async fn delete(&self, record: &SettingRecord) -> Result<bool, DomainError>;

    /// Storage type established for a path, independent of any record.
    async fn find_path_type(&self, key: &ScopeKey) -> Result<Option<StorageType>, DomainError>;

    /// Record the storage type established for a path, overwriting any previous one.
    async fn declare_path_type(
        &self,
        key: &ScopeKey,
        storage_type: StorageType,
    ) -> Result<(), DomainError>;
}
