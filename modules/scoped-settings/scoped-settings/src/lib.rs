//! Scoped Settings Module Implementation
//!
//! Typed settings stored under (vendor, plugin, path) with optional channel and
//! locale overrides. The public API is defined in `scoped-settings-sdk` and
//! re-exported here.

pub use scoped_settings_sdk::{
    PrecedenceTier, ResolvedSetting, ScopeKey, ScopedSettingsApi, ScopedSettingsError,
    SettingScope, SettingValue, SettingsAlias, StorageType, StoredSetting,
};

pub mod module;
pub use module::ScopedSettingsModule;

pub mod local_client;

pub mod config;
pub mod domain;
pub mod infra;
