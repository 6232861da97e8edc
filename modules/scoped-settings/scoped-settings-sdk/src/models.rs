//! Public models for the scoped settings module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the scoped settings module and its consumers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, OffsetDateTime};

/// Discriminator selecting which value slot of a stored setting is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Text,
    Boolean,
    Integer,
    Float,
    Datetime,
    Date,
    Json,
}

impl StorageType {
    pub const ALL: [Self; 7] = [
        Self::Text,
        Self::Boolean,
        Self::Integer,
        Self::Float,
        Self::Datetime,
        Self::Date,
        Self::Json,
    ];

    /// Tag as persisted in the `storage_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Datetime => "datetime",
            Self::Date => "date",
            Self::Json => "json",
        }
    }

    /// The value returned for an unset setting under the zero-value policy.
    #[must_use]
    pub fn zero_value(self) -> SettingValue {
        match self {
            Self::Text => SettingValue::Text(String::new()),
            Self::Boolean => SettingValue::Boolean(false),
            Self::Integer => SettingValue::Integer(0),
            Self::Float => SettingValue::Float(0.0),
            Self::Datetime => SettingValue::DateTime(OffsetDateTime::UNIX_EPOCH),
            Self::Date => SettingValue::Date(OffsetDateTime::UNIX_EPOCH.date()),
            Self::Json => SettingValue::Json(serde_json::Value::Null),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown storage type '{0}'")]
pub struct ParseStorageTypeError(pub String);

impl FromStr for StorageType {
    type Err = ParseStorageTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseStorageTypeError(s.to_owned()))
    }
}

/// A typed setting value. Exactly one variant per `StorageType`.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Text(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// An absolute instant, stored in UTC with second precision.
    DateTime(OffsetDateTime),
    /// A calendar date without time of day or timezone.
    Date(Date),
    /// Arbitrary structured data, stored as-is.
    Json(serde_json::Value),
}

impl SettingValue {
    #[must_use]
    pub const fn storage_type(&self) -> StorageType {
        match self {
            Self::Text(_) => StorageType::Text,
            Self::Boolean(_) => StorageType::Boolean,
            Self::Integer(_) => StorageType::Integer,
            Self::Float(_) => StorageType::Float,
            Self::DateTime(_) => StorageType::Datetime,
            Self::Date(_) => StorageType::Date,
            Self::Json(_) => StorageType::Json,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_datetime(&self) -> Option<OffsetDateTime> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<Date> {
        match self {
            Self::Date(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<OffsetDateTime> for SettingValue {
    fn from(v: OffsetDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Date> for SettingValue {
    fn from(v: Date) -> Self {
        Self::Date(v)
    }
}

impl From<serde_json::Value> for SettingValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

/// Identifies a logical setting independent of overrides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeKey {
    pub vendor: String,
    pub plugin: String,
    pub path: String,
}

impl ScopeKey {
    #[must_use]
    pub fn new(vendor: impl Into<String>, plugin: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            plugin: plugin.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.vendor, self.plugin, self.path)
    }
}

/// The override axis: an optional channel code and an optional locale code.
///
/// `SettingScope::default()` is the global scope (no channel, no locale).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettingScope {
    pub channel: Option<String>,
    pub locale: Option<String>,
}

impl SettingScope {
    #[must_use]
    pub fn global() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn channel(channel: impl Into<String>) -> Self {
        Self {
            channel: Some(channel.into()),
            locale: None,
        }
    }

    #[must_use]
    pub fn locale(locale: impl Into<String>) -> Self {
        Self {
            channel: None,
            locale: Some(locale.into()),
        }
    }

    #[must_use]
    pub fn channel_locale(channel: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            channel: Some(channel.into()),
            locale: Some(locale.into()),
        }
    }

    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.channel.is_none() && self.locale.is_none()
    }
}

impl fmt::Display for SettingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channel={}, locale={}",
            self.channel.as_deref().unwrap_or("*"),
            self.locale.as_deref().unwrap_or("*")
        )
    }
}

/// Which of the four (channel?, locale?) combinations produced a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrecedenceTier {
    /// Both channel and locale matched exactly.
    ChannelLocale,
    /// Channel matched, record is locale-agnostic.
    Channel,
    /// Locale matched, record is channel-agnostic.
    Locale,
    /// The global default record.
    Default,
}

impl fmt::Display for PrecedenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ChannelLocale => "channel+locale",
            Self::Channel => "channel",
            Self::Locale => "locale",
            Self::Default => "default",
        };
        f.write_str(s)
    }
}

/// A resolved value together with the tier it was found at.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSetting {
    pub value: SettingValue,
    pub tier: PrecedenceTier,
}

/// A persisted setting as seen by consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSetting {
    pub id: i64,
    pub key: ScopeKey,
    pub scope: SettingScope,
    pub value: SettingValue,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// The (vendor, plugin) pair and managed paths registered under an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsAlias {
    pub alias: String,
    pub vendor: String,
    pub plugin: String,
    pub paths: Vec<String>,
}
