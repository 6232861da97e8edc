use scoped_settings_sdk::{ScopeKey, SettingScope, StorageType};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};

use super::entity::setting;
use crate::domain::codec::ValueSlots;
use crate::domain::error::DomainError;
use crate::domain::record::{RecordParts, SettingRecord};

/// Parse the `storage_type` column. An empty column means the type was never set.
///
/// # Errors
/// `CorruptRecord` for a tag outside the known storage types.
pub fn parse_storage_type(id: Option<i64>, raw: &str) -> Result<Option<StorageType>, DomainError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|e| DomainError::corrupt_record(id, format!("{e}")))
}

impl TryFrom<setting::Model> for SettingRecord {
    type Error = DomainError;

    fn try_from(m: setting::Model) -> Result<Self, Self::Error> {
        let storage_type = parse_storage_type(Some(m.id), &m.storage_type)?;
        Self::restore(RecordParts {
            id: Some(m.id),
            key: ScopeKey::new(m.vendor, m.plugin, m.path),
            scope: SettingScope {
                channel: m.channel_code,
                locale: m.locale_code,
            },
            storage_type,
            slots: ValueSlots {
                text: m.text_value,
                boolean: m.boolean_value,
                integer: m.integer_value,
                float: m.float_value,
                datetime: m.datetime_value,
                date: m.date_value,
                json: m.json_value,
            },
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

/// Full-row active model: every column is written, so the six inactive slots are
/// cleared in the same statement that fills the active one.
#[must_use]
pub fn to_active_model(record: &SettingRecord) -> setting::ActiveModel {
    let key = record.key();
    let scope = record.scope();
    let slots = record.slots();

    setting::ActiveModel {
        id: record.id().map_or(NotSet, Unchanged),
        vendor: Set(key.vendor.clone()),
        plugin: Set(key.plugin.clone()),
        path: Set(key.path.clone()),
        channel_code: Set(scope.channel.clone()),
        locale_code: Set(scope.locale.clone()),
        storage_type: Set(record.storage_type().as_str().to_owned()),
        text_value: Set(slots.text.clone()),
        boolean_value: Set(slots.boolean),
        integer_value: Set(slots.integer),
        float_value: Set(slots.float),
        datetime_value: Set(slots.datetime),
        date_value: Set(slots.date),
        json_value: Set(slots.json.clone()),
        created_at: Set(record.created_at()),
        updated_at: Set(record.updated_at()),
    }
}
