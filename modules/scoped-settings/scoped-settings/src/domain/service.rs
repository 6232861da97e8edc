use std::collections::BTreeMap;
use std::sync::Arc;

use scoped_settings_sdk::{
    ResolvedSetting, ScopeKey, SettingScope, SettingValue, SettingsAlias, StorageType,
    StoredSetting,
};
use serde_json::Value as JsonValue;
use time::{Date, OffsetDateTime};
use tracing::{debug, error, info, warn};

use super::codec;
use super::error::DomainError;
use super::record::SettingRecord;
use super::registry::{self, AliasRegistry};
use super::repo::SettingRepository;
use super::resolver;
use crate::config::{LOCALE_CODE_WIDTH, ScopedSettingsConfig, UndefinedPolicy};

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub undefined_policy: UndefinedPolicy,
    pub max_locale_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            undefined_policy: UndefinedPolicy::ZeroValue,
            max_locale_length: LOCALE_CODE_WIDTH,
        }
    }
}

impl From<&ScopedSettingsConfig> for ServiceConfig {
    fn from(cfg: &ScopedSettingsConfig) -> Self {
        if cfg.max_locale_length > LOCALE_CODE_WIDTH {
            warn!(
                configured = cfg.max_locale_length,
                column_width = LOCALE_CODE_WIDTH,
                "max_locale_length exceeds the locale column and is capped"
            );
        }
        Self {
            undefined_policy: cfg.undefined_policy,
            max_locale_length: cfg.max_locale_length,
        }
    }
}

/// Entry point of the module: hands out a `Settings` handle per alias.
#[derive(Clone)]
pub struct ScopedSettingsService {
    registry: Arc<AliasRegistry>,
    repo: Arc<dyn SettingRepository>,
    config: Arc<ServiceConfig>,
}

impl ScopedSettingsService {
    #[must_use]
    pub fn new(
        registry: Arc<AliasRegistry>,
        repo: Arc<dyn SettingRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            registry,
            repo,
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &AliasRegistry {
        &self.registry
    }

    /// Settings handle bound to the (vendor, plugin) pair registered under `alias`.
    ///
    /// # Errors
    /// `UnknownAlias` when the alias is not registered.
    pub fn settings(&self, alias: &str) -> Result<Settings, DomainError> {
        let alias = self.registry.resolve(alias)?.clone();
        Ok(Settings::new(alias, self.repo.clone(), self.config.clone()))
    }
}

/// Typed read/write access to the settings of one (vendor, plugin) pair.
#[derive(Clone)]
pub struct Settings {
    alias: SettingsAlias,
    repo: Arc<dyn SettingRepository>,
    config: Arc<ServiceConfig>,
}

impl Settings {
    #[must_use]
    pub fn new(
        alias: SettingsAlias,
        repo: Arc<dyn SettingRepository>,
        config: Arc<ServiceConfig>,
    ) -> Self {
        Self {
            alias,
            repo,
            config,
        }
    }

    #[must_use]
    pub const fn alias(&self) -> &SettingsAlias {
        &self.alias
    }

    #[must_use]
    pub fn key(&self, path: &str) -> ScopeKey {
        registry::scope_key(&self.alias, path)
    }

    /// Resolve `path` for `scope` and report the tier the value came from.
    ///
    /// # Errors
    /// Integrity errors from stored data, storage errors, or `Validation` for a malformed scope.
    pub async fn resolve(
        &self,
        path: &str,
        scope: &SettingScope,
    ) -> Result<Option<ResolvedSetting>, DomainError> {
        self.validate_scope(path, scope)?;
        let key = self.key(path);
        let candidates = self.repo.find_by_scope_prefix(&key).await?;

        let Some((record, tier)) = resolver::resolve(scope, &candidates)? else {
            debug!(%key, %scope, "setting is unset");
            return Ok(None);
        };

        let value = record.value().inspect_err(|e| {
            error!(%key, id = ?record.id(), error = %e, "stored setting is corrupt");
        })?;
        Ok(Some(ResolvedSetting { value, tier }))
    }

    /// Effective value of `path` for `scope`.
    ///
    /// When nothing resolves, the configured `UndefinedPolicy` applies.
    ///
    /// # Errors
    /// `SettingUndefined` when unset and the policy gives no value; integrity and
    /// storage errors are propagated as-is.
    pub async fn get(&self, path: &str, scope: &SettingScope) -> Result<SettingValue, DomainError> {
        if let Some(resolved) = self.resolve(path, scope).await? {
            return Ok(resolved.value);
        }

        match self.config.undefined_policy {
            UndefinedPolicy::Require => Err(DomainError::setting_undefined(path, scope)),
            UndefinedPolicy::ZeroValue => match self.established_type(&self.key(path)).await? {
                Some(storage_type) => Ok(storage_type.zero_value()),
                None => Err(DomainError::setting_undefined(path, scope)),
            },
        }
    }

    /// Effective value of `path`, or `default` when nothing resolves.
    ///
    /// # Errors
    /// Integrity and storage errors; never `SettingUndefined`.
    pub async fn get_or(
        &self,
        path: &str,
        scope: &SettingScope,
        default: SettingValue,
    ) -> Result<SettingValue, DomainError> {
        Ok(self
            .resolve(path, scope)
            .await?
            .map_or(default, |resolved| resolved.value))
    }

    /// # Errors
    /// As `get`, plus `TypeMismatch` when the value is not text.
    pub async fn get_text(&self, path: &str, scope: &SettingScope) -> Result<String, DomainError> {
        match self.get(path, scope).await? {
            SettingValue::Text(v) => Ok(v),
            other => Err(kind_mismatch(path, StorageType::Text, &other)),
        }
    }

    /// # Errors
    /// As `get`, plus `TypeMismatch` when the value is not a boolean.
    pub async fn get_bool(&self, path: &str, scope: &SettingScope) -> Result<bool, DomainError> {
        let value = self.get(path, scope).await?;
        value
            .as_bool()
            .ok_or_else(|| kind_mismatch(path, StorageType::Boolean, &value))
    }

    /// # Errors
    /// As `get`, plus `TypeMismatch` when the value is not an integer.
    pub async fn get_integer(&self, path: &str, scope: &SettingScope) -> Result<i64, DomainError> {
        let value = self.get(path, scope).await?;
        value
            .as_integer()
            .ok_or_else(|| kind_mismatch(path, StorageType::Integer, &value))
    }

    /// # Errors
    /// As `get`, plus `TypeMismatch` when the value is not a float.
    pub async fn get_float(&self, path: &str, scope: &SettingScope) -> Result<f64, DomainError> {
        let value = self.get(path, scope).await?;
        value
            .as_float()
            .ok_or_else(|| kind_mismatch(path, StorageType::Float, &value))
    }

    /// # Errors
    /// As `get`, plus `TypeMismatch` when the value is not a datetime.
    pub async fn get_datetime(
        &self,
        path: &str,
        scope: &SettingScope,
    ) -> Result<OffsetDateTime, DomainError> {
        let value = self.get(path, scope).await?;
        value
            .as_datetime()
            .ok_or_else(|| kind_mismatch(path, StorageType::Datetime, &value))
    }

    /// # Errors
    /// As `get`, plus `TypeMismatch` when the value is not a date.
    pub async fn get_date(&self, path: &str, scope: &SettingScope) -> Result<Date, DomainError> {
        let value = self.get(path, scope).await?;
        value
            .as_date()
            .ok_or_else(|| kind_mismatch(path, StorageType::Date, &value))
    }

    /// # Errors
    /// As `get`, plus `TypeMismatch` when the value is not JSON.
    pub async fn get_json(
        &self,
        path: &str,
        scope: &SettingScope,
    ) -> Result<JsonValue, DomainError> {
        match self.get(path, scope).await? {
            SettingValue::Json(v) => Ok(v),
            other => Err(kind_mismatch(path, StorageType::Json, &other)),
        }
    }

    /// Resolved values of every path declared for this alias. Unset paths are omitted.
    ///
    /// # Errors
    /// The first resolution error encountered.
    pub async fn values(
        &self,
        scope: &SettingScope,
    ) -> Result<BTreeMap<String, SettingValue>, DomainError> {
        let mut values = BTreeMap::new();
        for path in &self.alias.paths {
            if let Some(resolved) = self.resolve(path, scope).await? {
                values.insert(path.clone(), resolved.value);
            }
        }
        Ok(values)
    }

    /// Store `value` for exactly `scope`, typed after the value itself.
    ///
    /// # Errors
    /// See `set_typed`.
    pub async fn set(
        &self,
        path: &str,
        value: SettingValue,
        scope: &SettingScope,
    ) -> Result<StoredSetting, DomainError> {
        let storage_type = codec::infer_type(&value);
        self.set_typed(path, storage_type, value, scope).await
    }

    /// Store `value` as `storage_type` for exactly `scope`.
    ///
    /// The first write to a path establishes its type; later writes in any scope
    /// must use the same type.
    ///
    /// # Errors
    /// - `TypeMismatch` against the value or the path's established type
    /// - `DuplicateScope` when a concurrent writer created the same scope first
    /// - `Validation` for a malformed scope
    pub async fn set_typed(
        &self,
        path: &str,
        storage_type: StorageType,
        value: SettingValue,
        scope: &SettingScope,
    ) -> Result<StoredSetting, DomainError> {
        self.validate_scope(path, scope)?;
        let key = self.key(path);

        let established = self.established_type(&key).await?;
        if let Some(expected) = established
            && expected != storage_type
        {
            warn!(%key, %expected, actual = %storage_type, "rejected write with a different storage type");
            return Err(DomainError::type_mismatch(path, expected, storage_type.as_str()));
        }

        let now = OffsetDateTime::now_utc();
        let record = match self.repo.find_one(&key, scope).await? {
            Some(mut existing) => {
                existing.assign(storage_type, value, now)?;
                existing
            }
            None => SettingRecord::with_type(key.clone(), scope.clone(), storage_type, value, now)?,
        };

        // the repository claims the path type for the first write atomically with the save
        let saved = self.repo.save(record).await.inspect_err(|e| match e {
            DomainError::TypeMismatch { .. } => {
                warn!(%key, %scope, error = %e, "concurrent write established another storage type");
            }
            e if e.is_integrity() => error!(%key, %scope, error = %e, "failed to save setting"),
            _ => {}
        })?;
        info!(%key, %scope, %storage_type, id = ?saved.id(), "setting saved");
        saved.to_stored()
    }

    /// Storage type established for `path`, if any write or declaration fixed one.
    ///
    /// # Errors
    /// Storage errors.
    pub async fn storage_type(&self, path: &str) -> Result<Option<StorageType>, DomainError> {
        self.established_type(&self.key(path)).await
    }

    /// Explicitly fix the storage type of `path` ahead of any write.
    ///
    /// A path that already has records keeps its type: re-declaring it to another
    /// type fails with `TypeMismatch`.
    ///
    /// # Errors
    /// `TypeMismatch` as described above, storage errors otherwise.
    pub async fn declare_storage_type(
        &self,
        path: &str,
        storage_type: StorageType,
    ) -> Result<(), DomainError> {
        self.validate_scope(path, &SettingScope::global())?;
        let key = self.key(path);

        let records = self.repo.find_by_scope_prefix(&key).await?;
        if let Some(existing) = records.first()
            && existing.storage_type() != storage_type
        {
            return Err(DomainError::type_mismatch(
                path,
                existing.storage_type(),
                storage_type.as_str(),
            ));
        }

        self.repo.declare_path_type(&key, storage_type).await?;
        info!(%key, %storage_type, "storage type declared");
        Ok(())
    }

    /// Delete the override stored for exactly `scope`.
    ///
    /// The path's established type is kept, so the remaining records and later
    /// writes still agree on it.
    ///
    /// # Errors
    /// `Validation` when `scope` is the global default, storage errors otherwise.
    pub async fn remove_override(
        &self,
        path: &str,
        scope: &SettingScope,
    ) -> Result<bool, DomainError> {
        self.validate_scope(path, scope)?;
        if scope.is_global() {
            return Err(DomainError::validation(
                "scope",
                "the default record is not an override and cannot be removed",
            ));
        }

        let key = self.key(path);
        let Some(record) = self.repo.find_one(&key, scope).await? else {
            debug!(%key, %scope, "no override to remove");
            return Ok(false);
        };

        let deleted = self.repo.delete(&record).await?;
        info!(%key, %scope, deleted, "override removed");
        Ok(deleted)
    }

    /// Reassign the record stored for `from` to the `to` scope.
    ///
    /// # Errors
    /// `Validation` when `from` is the global default, `SettingUndefined` when
    /// nothing is stored for `from`, `DuplicateScope` when `to` is already taken.
    pub async fn move_override(
        &self,
        path: &str,
        from: &SettingScope,
        to: &SettingScope,
    ) -> Result<StoredSetting, DomainError> {
        self.validate_scope(path, from)?;
        self.validate_scope(path, to)?;
        if from.is_global() {
            return Err(DomainError::validation(
                "from",
                "the default record is not an override and cannot be moved",
            ));
        }
        let key = self.key(path);

        let Some(mut record) = self.repo.find_one(&key, from).await? else {
            return Err(DomainError::setting_undefined(path, from));
        };
        if from == to {
            return record.to_stored();
        }
        if self.repo.find_one(&key, to).await?.is_some() {
            return Err(DomainError::duplicate_scope(&key, to));
        }

        record.reassign_scope(to.clone(), OffsetDateTime::now_utc());
        let saved = self.repo.save(record).await?;
        info!(%key, %from, %to, "override moved");
        saved.to_stored()
    }

    /// Declared path type, falling back to the type of any stored record.
    async fn established_type(&self, key: &ScopeKey) -> Result<Option<StorageType>, DomainError> {
        if let Some(storage_type) = self.repo.find_path_type(key).await? {
            return Ok(Some(storage_type));
        }
        Ok(self
            .repo
            .find_by_scope_prefix(key)
            .await?
            .first()
            .map(SettingRecord::storage_type))
    }

    fn validate_scope(&self, path: &str, scope: &SettingScope) -> Result<(), DomainError> {
        if path.trim().is_empty() {
            return Err(DomainError::validation("path", "must not be empty"));
        }
        if scope.channel.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(DomainError::validation("channel", "must not be empty when set"));
        }
        if let Some(locale) = scope.locale.as_deref() {
            if locale.trim().is_empty() {
                return Err(DomainError::validation("locale", "must not be empty when set"));
            }
            let max = self.config.max_locale_length.min(LOCALE_CODE_WIDTH);
            if locale.chars().count() > max {
                return Err(DomainError::validation(
                    "locale",
                    format!("'{locale}' exceeds maximum length of {max}"),
                ));
            }
        }
        Ok(())
    }
}

fn kind_mismatch(path: &str, expected: StorageType, actual: &SettingValue) -> DomainError {
    DomainError::type_mismatch(path, expected, actual.storage_type().as_str())
}
