use async_trait::async_trait;
use scoped_settings_sdk::{
    ResolvedSetting, ScopedSettingsApi, ScopedSettingsError, SettingScope, SettingValue,
    SettingsAlias, StoredSetting,
};

use crate::domain::service::ScopedSettingsService;

/// In-process implementation of `ScopedSettingsApi` over the domain service.
pub struct LocalClient {
    service: ScopedSettingsService,
}

impl LocalClient {
    #[must_use]
    pub const fn new(service: ScopedSettingsService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ScopedSettingsApi for LocalClient {
    async fn get(
        &self,
        alias: &str,
        path: &str,
        scope: &SettingScope,
    ) -> Result<SettingValue, ScopedSettingsError> {
        let settings = self.service.settings(alias)?;
        settings.get(path, scope).await.map_err(Into::into)
    }

    async fn get_or(
        &self,
        alias: &str,
        path: &str,
        scope: &SettingScope,
        default: SettingValue,
    ) -> Result<SettingValue, ScopedSettingsError> {
        let settings = self.service.settings(alias)?;
        settings
            .get_or(path, scope, default)
            .await
            .map_err(Into::into)
    }

    async fn resolve(
        &self,
        alias: &str,
        path: &str,
        scope: &SettingScope,
    ) -> Result<Option<ResolvedSetting>, ScopedSettingsError> {
        let settings = self.service.settings(alias)?;
        settings.resolve(path, scope).await.map_err(Into::into)
    }

    async fn set(
        &self,
        alias: &str,
        path: &str,
        value: SettingValue,
        scope: &SettingScope,
    ) -> Result<StoredSetting, ScopedSettingsError> {
        let settings = self.service.settings(alias)?;
        settings.set(path, value, scope).await.map_err(Into::into)
    }

    async fn remove_override(
        &self,
        alias: &str,
        path: &str,
        scope: &SettingScope,
    ) -> Result<bool, ScopedSettingsError> {
        let settings = self.service.settings(alias)?;
        settings
            .remove_override(path, scope)
            .await
            .map_err(Into::into)
    }

    async fn resolve_alias(&self, alias: &str) -> Result<SettingsAlias, ScopedSettingsError> {
        Ok(self.service.registry().resolve(alias)?.clone())
    }
}
