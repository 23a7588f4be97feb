//! Catalog of known keyboard identifiers and their display names.
//!
//! The catalog is loaded once at startup and never modified afterwards. It
//! is handed to the [`IdentifierResolver`](crate::services::IdentifierResolver)
//! as a value, so tests can build catalogs of their own.

pub mod xkb_rules;

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Registry shipped by xkeyboard-config on most Linux systems.
pub const DEFAULT_XKB_RULES_PATH: &str = "/usr/share/X11/xkb/rules/evdev.xml";

/// Known keyboard identifiers, indexed by display name.
///
/// Display names are kept sorted so that fallback searches visit them in a
/// stable order. When two identifiers share a display name, the one added
/// last wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierCatalog {
    by_name: BTreeMap<String, String>,
}

impl IdentifierCatalog {
    /// Builds a catalog from `(identifier, display name)` pairs.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let by_name = entries
            .into_iter()
            .map(|(identifier, name)| (name.into(), identifier.into()))
            .collect();
        Self { by_name }
    }

    /// Loads a catalog, choosing the format from the file extension.
    ///
    /// `.json` files are read with [`Self::load_json`]; anything else is
    /// treated as an xkeyboard-config registry.
    pub fn load(path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::load_json(path)
        } else {
            Self::load_xkb_rules(path)
        }
    }

    /// Loads a JSON object mapping identifiers to display names.
    ///
    /// ```json
    /// { "de": "German", "us": "English (US)" }
    /// ```
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;
        Ok(Self::from_entries(entries))
    }

    /// Loads layouts and variants from an xkeyboard-config registry file.
    pub fn load_xkb_rules(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read XKB registry: {}", path.display()))?;
        let layouts = xkb_rules::parse_registry(&content)
            .with_context(|| format!("Failed to parse XKB registry: {}", path.display()))?;
        Ok(Self::from_entries(
            layouts
                .into_iter()
                .map(|layout| (layout.identifier, layout.description)),
        ))
    }

    /// Looks up the identifier registered under an exact display name.
    pub fn identifier_for(&self, display_name: &str) -> Option<&str> {
        self.by_name.get(display_name).map(String::as_str)
    }

    /// Iterates `(display name, identifier)` pairs in display-name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_name
            .iter()
            .map(|(name, identifier)| (name.as_str(), identifier.as_str()))
    }

    /// Number of distinct display names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
