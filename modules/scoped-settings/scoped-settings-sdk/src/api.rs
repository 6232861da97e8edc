//! `ScopedSettingsApi` trait definition.
//!
//! Settings are addressed by alias (see `SettingsAlias`) and path, with an
//! optional channel/locale override scope.

use async_trait::async_trait;

use crate::errors::ScopedSettingsError;
use crate::models::{ResolvedSetting, SettingScope, SettingValue, SettingsAlias, StoredSetting};

/// Public API trait for the scoped settings module.
#[async_trait]
pub trait ScopedSettingsApi: Send + Sync {
    /// Resolve the effective value of a setting for the given scope.
    ///
    /// Falls back through channel+locale, channel, locale and the global default.
    /// When nothing resolves, the module's undefined policy decides between a
    /// zero value of the path's type and `NotFound`.
    async fn get(
        &self,
        alias: &str,
        path: &str,
        scope: &SettingScope,
    ) -> Result<SettingValue, ScopedSettingsError>;

    /// Like `get`, but returns `default` whenever nothing resolves.
    async fn get_or(
        &self,
        alias: &str,
        path: &str,
        scope: &SettingScope,
        default: SettingValue,
    ) -> Result<SettingValue, ScopedSettingsError>;

    /// Resolve a setting together with the precedence tier that produced it.
    /// Returns `None` when no record matches.
    async fn resolve(
        &self,
        alias: &str,
        path: &str,
        scope: &SettingScope,
    ) -> Result<Option<ResolvedSetting>, ScopedSettingsError>;

    /// Store a value for exactly the given scope, creating the record if needed.
    ///
    /// The first write to a path fixes its storage type for every scope.
    async fn set(
        &self,
        alias: &str,
        path: &str,
        value: SettingValue,
        scope: &SettingScope,
    ) -> Result<StoredSetting, ScopedSettingsError>;

    /// Delete the override stored for exactly the given scope.
    /// Returns `false` when no such override exists.
    async fn remove_override(
        &self,
        alias: &str,
        path: &str,
        scope: &SettingScope,
    ) -> Result<bool, ScopedSettingsError>;

    /// Look up the vendor, plugin and declared paths registered under an alias.
    async fn resolve_alias(&self, alias: &str) -> Result<SettingsAlias, ScopedSettingsError>;
}
