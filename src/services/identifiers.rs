//! Locale to keyboard identifier resolution.
//!
//! A layout's locale and display name are mapped to a keyboard identifier by
//! an ordered list of rules; the first rule that decides wins:
//!
//! 1. [`MatchRule::Override`]: fixed per-locale table (may disable a locale)
//! 2. [`MatchRule::ExactName`]: display name equals a catalog name
//! 3. [`MatchRule::NameWord`]: one word of the display name equals a catalog name
//! 4. [`MatchRule::CatalogWord`]: one word of a catalog name, stripped of
//!    parentheses, equals the display name
//!
//! Rules 3 and 4 are heuristics and may pick the wrong layout, so their
//! matches are reported separately from exact ones.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::catalog::IdentifierCatalog;

/// Locales whose identifier cannot be derived from the display name.
const BUILTIN_OVERRIDES: &[(&str, Option<&str>)] = &[
    ("af", Some("za")),
    ("en", Some("us")),
    ("en-GB", Some("uk")),
    ("es-US", Some("latam")),
    ("fr-CA", Some("ca")),
    ("hi", Some("in+bolnagri")),
    ("ky", Some("kg")),
    ("nl-BE", Some("be")),
    ("zu", None),
];

/// Override table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleOverride {
    /// Always use this identifier
    Layout(String),
    /// Never convert this locale
    Disabled,
}

/// Fixed locale to identifier mappings consulted before the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    entries: BTreeMap<String, LocaleOverride>,
}

impl OverrideTable {
    /// Creates a table without entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the built-in table.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (locale, identifier) in BUILTIN_OVERRIDES {
            let entry = identifier.map_or(LocaleOverride::Disabled, |id| {
                LocaleOverride::Layout(id.to_string())
            });
            table.insert(*locale, entry);
        }
        table
    }

    /// Adds or replaces the entry for `locale`.
    pub fn insert(&mut self, locale: impl Into<String>, entry: LocaleOverride) {
        self.entries.insert(locale.into(), entry);
    }

    /// Looks up the entry for `locale`.
    pub fn get(&self, locale: &str) -> Option<&LocaleOverride> {
        self.entries.get(locale)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A resolution rule, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRule {
    /// Entry in the override table
    Override,
    /// Display name found verbatim in the catalog
    ExactName,
    /// A word of the display name found in the catalog
    NameWord,
    /// The display name found as a word of a catalog name
    CatalogWord,
}

/// Resolution rules in precedence order.
pub const RESOLUTION_RULES: [MatchRule; 4] = [
    MatchRule::Override,
    MatchRule::ExactName,
    MatchRule::NameWord,
    MatchRule::CatalogWord,
];

impl MatchRule {
    /// Whether matches of this rule are heuristic.
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::NameWord | Self::CatalogWord)
    }
}

/// What a single rule decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule does not apply; try the next one
    NoMatch,
    /// The rule found an identifier
    Matched(String),
    /// The rule rejects the locale outright
    Disabled,
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Keyboard identifier
    pub identifier: String,
    /// Rule that produced it
    pub rule: MatchRule,
}

/// Resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The override table disables the locale
    #[error("layout {locale} explicitly disabled in overrides")]
    Disabled {
        /// Locale identifier
        locale: String,
    },
    /// No rule matched
    #[error("failed to find XKB mapping for {locale} ({name})")]
    NotFound {
        /// Locale identifier
        locale: String,
        /// Display name
        name: String,
    },
}

/// Resolves layouts to keyboard identifiers.
///
/// Holds the override table and catalog by value; both are read-only for the
/// resolver's lifetime.
#[derive(Debug, Clone)]
pub struct IdentifierResolver {
    overrides: OverrideTable,
    catalog: IdentifierCatalog,
}

impl IdentifierResolver {
    /// Creates a resolver from an override table and a catalog.
    pub fn new(overrides: OverrideTable, catalog: IdentifierCatalog) -> Self {
        Self { overrides, catalog }
    }

    /// Returns the catalog consulted by the fallback rules.
    pub fn catalog(&self) -> &IdentifierCatalog {
        &self.catalog
    }

    /// Resolves a locale and display name to an identifier.
    pub fn resolve(&self, locale: &str, name: &str) -> Result<Resolution, ResolveError> {
        for rule in RESOLUTION_RULES {
            match self.evaluate(rule, locale, name) {
                RuleOutcome::NoMatch => {}
                RuleOutcome::Matched(identifier) => {
                    return Ok(Resolution { identifier, rule });
                }
                RuleOutcome::Disabled => {
                    return Err(ResolveError::Disabled {
                        locale: locale.to_string(),
                    });
                }
            }
        }

        Err(ResolveError::NotFound {
            locale: locale.to_string(),
            name: name.to_string(),
        })
    }

    /// Evaluates one rule in isolation.
    pub fn evaluate(&self, rule: MatchRule, locale: &str, name: &str) -> RuleOutcome {
        match rule {
            MatchRule::Override => match self.overrides.get(locale) {
                Some(LocaleOverride::Layout(identifier)) => {
                    debug!("override for {} → {}", locale, identifier);
                    RuleOutcome::Matched(identifier.clone())
                }
                Some(LocaleOverride::Disabled) => {
                    debug!("override for {} → disabled", locale);
                    RuleOutcome::Disabled
                }
                None => RuleOutcome::NoMatch,
            },
            MatchRule::ExactName => match self.catalog.identifier_for(name) {
                Some(identifier) => RuleOutcome::Matched(identifier.to_string()),
                None => {
                    debug!("name {} failed", name);
                    RuleOutcome::NoMatch
                }
            },
            MatchRule::NameWord => {
                for word in name.split_whitespace() {
                    if let Some(identifier) = self.catalog.identifier_for(word) {
                        debug!(
                            "exact name failed but matched locale word: {} ({}) → {} ({})",
                            locale, name, identifier, word
                        );
                        return RuleOutcome::Matched(identifier.to_string());
                    }
                }
                RuleOutcome::NoMatch
            }
            MatchRule::CatalogWord => {
                for (catalog_name, identifier) in self.catalog.entries() {
                    let hit = catalog_name
                        .split_whitespace()
                        .any(|word| word.trim_matches(['(', ')']) == name);
                    if hit {
                        debug!(
                            "exact name failed but matched catalog word: {} ({}) → {} ({})",
                            locale, name, identifier, catalog_name
                        );
                        return RuleOutcome::Matched(identifier.to_string());
                    }
                }
                RuleOutcome::NoMatch
            }
        }
    }
}
