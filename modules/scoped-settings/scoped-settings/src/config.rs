use std::collections::BTreeMap;
use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;

use crate::domain::seed::SeedSetting;

/// Section of the application config this module reads.
pub const CONFIG_SECTION: &str = "modules.scoped_settings";

/// Prefix of environment variables overriding the YAML config.
pub const ENV_PREFIX: &str = "SCOPED_SETTINGS__";

/// Width of the `locale_code` column. Longer locales cannot be stored, whatever
/// `max_locale_length` says.
pub const LOCALE_CODE_WIDTH: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct ScopedSettingsConfig {
    #[serde(default)]
    pub undefined_policy: UndefinedPolicy,
    #[serde(default = "default_max_locale_length")]
    pub max_locale_length: usize,
    #[serde(default)]
    pub aliases: BTreeMap<String, AliasConfig>,
    #[serde(default)]
    pub seeds: Vec<SeedSetting>,
}

impl Default for ScopedSettingsConfig {
    fn default() -> Self {
        Self {
            undefined_policy: UndefinedPolicy::default(),
            max_locale_length: default_max_locale_length(),
            aliases: BTreeMap::new(),
            seeds: Vec::new(),
        }
    }
}

impl ScopedSettingsConfig {
    /// Extract the module section from an already assembled figment.
    ///
    /// A missing section yields the defaults.
    ///
    /// # Errors
    /// Returns an error when the section exists but does not deserialize.
    pub fn from_figment(figment: &Figment) -> anyhow::Result<Self> {
        if figment.find_value(CONFIG_SECTION).is_err() {
            return Ok(Self::default());
        }
        Ok(figment.extract_inner(CONFIG_SECTION)?)
    }

    /// Load the module section from a YAML file, with `SCOPED_SETTINGS__*`
    /// environment variables layered on top (`__` separates nested keys).
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or the section is malformed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let figment = Figment::new().merge(Yaml::file(path)).merge(
            Env::prefixed(ENV_PREFIX)
                .split("__")
                .map(|key| format!("{CONFIG_SECTION}.{key}").into()),
        );
        Self::from_figment(&figment)
    }
}

/// What `get` returns when no record resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedPolicy {
    /// Zero value of the path's established type; `SettingUndefined` if the path has no type.
    #[default]
    ZeroValue,
    /// Always `SettingUndefined`.
    Require,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AliasConfig {
    pub vendor: String,
    pub plugin: String,
    #[serde(default)]
    pub paths: Vec<String>,
}

const fn default_max_locale_length() -> usize {
    LOCALE_CODE_WIDTH
}
