//! Alias registry: short names for (vendor, plugin) pairs.
//!
//! Built once, explicitly, and read-only afterwards. Share it behind an `Arc`.

use std::collections::HashMap;

use scoped_settings_sdk::{ScopeKey, SettingsAlias};

use super::error::DomainError;
use crate::config::AliasConfig;

#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    entries: HashMap<String, SettingsAlias>,
}

impl AliasRegistry {
    #[must_use]
    pub fn builder() -> AliasRegistryBuilder {
        AliasRegistryBuilder::default()
    }

    /// Build a registry from the `aliases` section of the module config.
    ///
    /// # Errors
    /// `Validation` for malformed aliases or empty vendor/plugin names.
    pub fn from_config<'a>(
        aliases: impl IntoIterator<Item = (&'a String, &'a AliasConfig)>,
    ) -> Result<Self, DomainError> {
        let mut builder = Self::builder();
        for (alias, cfg) in aliases {
            builder = builder.register(alias, &cfg.vendor, &cfg.plugin, cfg.paths.iter())?;
        }
        Ok(builder.build())
    }

    /// # Errors
    /// `UnknownAlias` when nothing is registered under `alias`.
    pub fn resolve(&self, alias: &str) -> Result<&SettingsAlias, DomainError> {
        self.entries
            .get(alias)
            .ok_or_else(|| DomainError::unknown_alias(alias))
    }

    pub fn aliases(&self) -> impl Iterator<Item = &SettingsAlias> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct AliasRegistryBuilder {
    entries: HashMap<String, SettingsAlias>,
}

impl AliasRegistryBuilder {
    /// # Errors
    /// `Validation` when the alias is malformed or already registered, or when
    /// vendor or plugin is empty.
    pub fn register<P: AsRef<str>>(
        mut self,
        alias: &str,
        vendor: &str,
        plugin: &str,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Self, DomainError> {
        validate_alias(alias)?;
        if vendor.trim().is_empty() {
            return Err(DomainError::validation("vendor", "must not be empty"));
        }
        if plugin.trim().is_empty() {
            return Err(DomainError::validation("plugin", "must not be empty"));
        }
        if self.entries.contains_key(alias) {
            return Err(DomainError::validation(
                "alias",
                format!("'{alias}' is already registered"),
            ));
        }

        let mut paths: Vec<String> = paths.into_iter().map(|p| p.as_ref().to_owned()).collect();
        paths.sort();
        paths.dedup();

        self.entries.insert(
            alias.to_owned(),
            SettingsAlias {
                alias: alias.to_owned(),
                vendor: vendor.to_owned(),
                plugin: plugin.to_owned(),
                paths,
            },
        );
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> AliasRegistry {
        AliasRegistry {
            entries: self.entries,
        }
    }
}

/// Scope key of `path` under the (vendor, plugin) pair of `alias`.
#[must_use]
pub fn scope_key(alias: &SettingsAlias, path: &str) -> ScopeKey {
    ScopeKey::new(&alias.vendor, &alias.plugin, path)
}

fn validate_alias(alias: &str) -> Result<(), DomainError> {
    if alias.is_empty() {
        return Err(DomainError::validation("alias", "must not be empty"));
    }
    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(DomainError::validation(
            "alias",
            format!("'{alias}' may only contain ASCII letters, digits, '_', '.' and '-'"),
        ));
    }
    Ok(())
}
