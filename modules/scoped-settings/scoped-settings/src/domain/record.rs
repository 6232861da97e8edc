use scoped_settings_sdk::{ScopeKey, SettingScope, SettingValue, StorageType, StoredSetting};
use time::OffsetDateTime;

use super::codec::{self, ValueSlots};
use super::error::DomainError;

/// A stored setting: scope key, override axis, storage type and one occupied slot.
///
/// Fields are private so that a record with mismatched type and slots can only be
/// observed through `restore`, which rejects it.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingRecord {
    id: Option<i64>,
    key: ScopeKey,
    scope: SettingScope,
    storage_type: StorageType,
    slots: ValueSlots,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

/// Raw columns of a persisted record, as read back from storage.
#[derive(Debug, Clone)]
pub struct RecordParts {
    pub id: Option<i64>,
    pub key: ScopeKey,
    pub scope: SettingScope,
    pub storage_type: Option<StorageType>,
    pub slots: ValueSlots,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SettingRecord {
    /// Build a new, not yet persisted record typed after `value`.
    ///
    /// # Errors
    /// Propagates codec errors (e.g. a JSON `null` value).
    pub fn new(
        key: ScopeKey,
        scope: SettingScope,
        value: SettingValue,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        let storage_type = codec::infer_type(&value);
        Self::with_type(key, scope, storage_type, value, now)
    }

    /// Build a new record with an explicitly declared storage type.
    ///
    /// # Errors
    /// `TypeMismatch` when `value` is not of `storage_type`.
    pub fn with_type(
        key: ScopeKey,
        scope: SettingScope,
        storage_type: StorageType,
        value: SettingValue,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        let slots = codec::encode(&key.path, storage_type, value)?;
        Ok(Self {
            id: None,
            key,
            scope,
            storage_type,
            slots,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a record from storage, checking the single-slot invariant.
    ///
    /// # Errors
    /// `StorageTypeUndefined` or `CorruptRecord` when the stored columns are inconsistent.
    pub fn restore(parts: RecordParts) -> Result<Self, DomainError> {
        let Some(storage_type) = parts.storage_type else {
            return Err(DomainError::storage_type_undefined(parts.key.path));
        };
        codec::decode(parts.id, &parts.key.path, Some(storage_type), &parts.slots)?;
        Ok(Self {
            id: parts.id,
            key: parts.key,
            scope: parts.scope,
            storage_type,
            slots: parts.slots,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        })
    }

    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    #[must_use]
    pub const fn key(&self) -> &ScopeKey {
        &self.key
    }

    #[must_use]
    pub const fn scope(&self) -> &SettingScope {
        &self.scope
    }

    #[must_use]
    pub const fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    #[must_use]
    pub const fn slots(&self) -> &ValueSlots {
        &self.slots
    }

    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    /// Decode the active slot.
    ///
    /// # Errors
    /// `CorruptRecord` if the slots disagree with the storage type.
    pub fn value(&self) -> Result<SettingValue, DomainError> {
        codec::decode(self.id, &self.key.path, Some(self.storage_type), &self.slots)
    }

    /// Replace type and value together. On error the record is left untouched.
    ///
    /// # Errors
    /// `TypeMismatch` when `value` is not of `storage_type`.
    pub fn assign(
        &mut self,
        storage_type: StorageType,
        value: SettingValue,
        now: OffsetDateTime,
    ) -> Result<(), DomainError> {
        let slots = codec::encode(&self.key.path, storage_type, value)?;
        self.storage_type = storage_type;
        self.slots = slots;
        self.updated_at = now;
        Ok(())
    }

    /// Move the record to another (channel, locale) pair.
    pub fn reassign_scope(&mut self, scope: SettingScope, now: OffsetDateTime) {
        self.scope = scope;
        self.updated_at = now;
    }

    /// Attach the identity assigned by the store.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Public view of a persisted record.
    ///
    /// # Errors
    /// `CorruptRecord` if the record was never persisted or its slots are inconsistent.
    pub fn to_stored(&self) -> Result<StoredSetting, DomainError> {
        let id = self
            .id
            .ok_or_else(|| DomainError::corrupt_record(None, "record has not been persisted"))?;
        Ok(StoredSetting {
            id,
            key: self.key.clone(),
            scope: self.scope.clone(),
            value: self.value()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
