//! Bulk loading of settings from flat seed options (fixtures, config `seeds`).

use scoped_settings_sdk::{SettingScope, StorageType, StoredSetting};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::info;

use super::codec;
use super::error::DomainError;
use super::service::ScopedSettingsService;

/// One seed entry: the alias-addressed setting and its loosely typed value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedSetting {
    pub alias: String,
    pub path: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    /// One of `text`, `boolean`, `integer`, `float`, `json`, `date`, `datetime`.
    #[serde(rename = "type", default = "default_seed_type")]
    pub storage_type: String,
    #[serde(default)]
    pub value: JsonValue,
}

impl SeedSetting {
    #[must_use]
    pub fn scope(&self) -> SettingScope {
        SettingScope {
            channel: self.channel.clone(),
            locale: self.locale.clone(),
        }
    }
}

fn default_seed_type() -> String {
    StorageType::Text.as_str().to_owned()
}

pub struct SeedLoader {
    service: ScopedSettingsService,
}

impl SeedLoader {
    #[must_use]
    pub const fn new(service: ScopedSettingsService) -> Self {
        Self { service }
    }

    /// Coerce the seed value to its declared type and store it.
    ///
    /// An unknown `type` is rejected before the alias is resolved or the store is touched.
    ///
    /// # Errors
    /// `Validation` for an unknown type, `UnknownAlias`, coercion errors, and
    /// whatever `Settings::set_typed` returns.
    pub async fn load(&self, seed: &SeedSetting) -> Result<StoredSetting, DomainError> {
        let storage_type: StorageType = seed
            .storage_type
            .parse()
            .map_err(|e: scoped_settings_sdk::ParseStorageTypeError| {
                DomainError::validation("type", e.to_string())
            })?;
        let settings = self.service.settings(&seed.alias)?;
        let value = codec::coerce(&seed.path, storage_type, seed.value.clone())?;

        settings
            .set_typed(&seed.path, storage_type, value, &seed.scope())
            .await
    }

    /// Load seeds in order, stopping at the first failure.
    ///
    /// # Errors
    /// The first error returned by `load`.
    pub async fn load_all(&self, seeds: &[SeedSetting]) -> Result<Vec<StoredSetting>, DomainError> {
        let mut stored = Vec::with_capacity(seeds.len());
        for seed in seeds {
            stored.push(self.load(seed).await?);
        }
        info!(count = stored.len(), "settings seeds loaded");
        Ok(stored)
    }
}
