//! Configuration management for the converter.
//!
//! This module handles loading and validating the optional TOML
//! configuration with platform-specific directory resolution. Every section
//! and field is optional; an absent file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::DEFAULT_XKB_RULES_PATH;
use crate::constants::{APP_BINARY_NAME, DEFAULT_BATCH_SUFFIX};
use crate::services::{LocaleOverride, OverrideTable};

/// Identifier catalog location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// XKB registry (`evdev.xml`) or JSON `{identifier: name}` file
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_XKB_RULES_PATH),
        }
    }
}

/// Additions to the built-in override table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverridesConfig {
    /// Locales that are never converted
    pub disabled: Vec<String>,
    /// Locale to identifier mappings, replacing built-in entries
    pub layouts: BTreeMap<String, String>,
}

/// Directory conversion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File name suffix selecting documents in a source directory
    pub suffix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_BATCH_SUFFIX.to_string(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/cldr2json/config.toml`
/// - macOS: `~/Library/Application Support/cldr2json/config.toml`
/// - Windows: `%APPDATA%\cldr2json\config.toml`
///
/// # Validation
///
/// - `batch.suffix` must not be empty
/// - a locale may not be both mapped and disabled in `overrides`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier catalog
    pub catalog: CatalogConfig,
    /// Override table additions
    pub overrides: OverridesConfig,
    /// Directory conversion
    pub batch: BatchConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_BINARY_NAME);
        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        if !config_path.exists() {
            return Ok(Self::new());
        }
        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.batch.suffix.is_empty() {
            anyhow::bail!("batch.suffix must not be empty");
        }

        if let Some(locale) = self
            .overrides
            .disabled
            .iter()
            .find(|locale| self.overrides.layouts.contains_key(locale.as_str()))
        {
            anyhow::bail!("locale '{locale}' is both mapped and disabled in overrides");
        }

        Ok(())
    }

    /// Builds the override table: built-in entries, then configured layouts,
    /// then disabled locales.
    pub fn override_table(&self) -> OverrideTable {
        let mut table = OverrideTable::builtin();
        for (locale, identifier) in &self.overrides.layouts {
            table.insert(locale.clone(), LocaleOverride::Layout(identifier.clone()));
        }
        for locale in &self.overrides.disabled {
            table.insert(locale.clone(), LocaleOverride::Disabled);
        }
        table
    }
}
