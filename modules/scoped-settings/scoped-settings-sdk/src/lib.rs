//! Scoped Settings SDK
//!
//! This crate provides the public API for the `scoped-settings` module:
//! - `ScopedSettingsApi` trait
//! - Typed setting values (`SettingValue`) and their storage tags (`StorageType`)
//! - Scope types: `ScopeKey` (vendor, plugin, path) and `SettingScope` (channel, locale)
//! - Error type (`ScopedSettingsError`)
//!
//! ## Usage
//!
//! ```ignore
//! use scoped_settings_sdk::{ScopedSettingsApi, SettingScope, SettingValue};
//!
//! let scope = SettingScope::channel("mobile");
//! client.set("acme_catalog", "page_size", SettingValue::Integer(50), &scope).await?;
//! let page_size = client.get("acme_catalog", "page_size", &scope).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod errors;
pub mod models;

pub use api::ScopedSettingsApi;
pub use errors::ScopedSettingsError;
pub use models::{
    ParseStorageTypeError, PrecedenceTier, ResolvedSetting, ScopeKey, SettingScope,
    SettingValue, SettingsAlias, StorageType, StoredSetting,
};
