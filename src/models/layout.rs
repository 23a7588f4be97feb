//! Layout, level and row data structures.
//!
//! A [`Layout`] is what one CLDR keyboard document becomes: an ordered list
//! of [`Level`]s (one per modifier state), each made of [`Row`]s of keys,
//! top row first. The serialized form is the on-screen keyboard JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::models::Key;

/// Level tag of the unmodified level.
pub const LEVEL_DEFAULT: &str = "";
/// Level tag of the latched shift level.
pub const LEVEL_SHIFT: &str = "shift";
/// Level tag of the first symbol level.
pub const LEVEL_OPT: &str = "opt";
/// Level tag of the second symbol level.
pub const LEVEL_OPT_SHIFT: &str = "opt+shift";

/// How a level is activated on the on-screen keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelMode {
    /// Shown when no modifier is active
    Default,
    /// Active for the next key press only
    Latched,
    /// Stays active until switched off
    Locked,
}

impl fmt::Display for LevelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Latched => "latched",
            Self::Locked => "locked",
        };
        f.write_str(name)
    }
}

/// A positional edit applied to a [`Row`].
#[derive(Debug, Clone, PartialEq)]
pub enum RowEdit {
    /// Insert a key before position `n` (`n == len` appends)
    InsertAt(usize, Key),
    /// Append a key to the end of the row
    Append(Key),
    /// Replace the key at position `n`, yielding the old key
    ReplaceAt(usize, Key),
    /// Remove the key at position `n`, yielding it
    RemoveAt(usize),
}

/// A [`RowEdit`] whose precondition did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{edit} needs a row of at least {needed} keys, found {len}")]
pub struct RowEditError {
    /// Edit name (`insert-at`, `replace-at`, `remove-at`)
    pub edit: &'static str,
    /// Required length
    pub needed: usize,
    /// Actual length
    pub len: usize,
}

/// One physical keyboard row, keys ordered left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    keys: Vec<Key>,
}

impl Row {
    /// Creates a row from keys in left-to-right order.
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    /// Returns the keys in left-to-right order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Returns the key at `index`.
    pub fn get(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    /// Number of keys in the row.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the row has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Inserts `key` before position `index` (`index == len` appends).
    pub fn insert_at(&mut self, index: usize, key: Key) -> Result<(), RowEditError> {
        self.require("insert-at", index)?;
        self.keys.insert(index, key);
        Ok(())
    }

    /// Appends `key` to the end of the row.
    pub fn append(&mut self, key: Key) {
        self.keys.push(key);
    }

    /// Replaces the key at `index`, returning the old one.
    pub fn replace_at(&mut self, index: usize, key: Key) -> Result<Key, RowEditError> {
        self.require("replace-at", index + 1)?;
        Ok(std::mem::replace(&mut self.keys[index], key))
    }

    /// Removes and returns the key at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<Key, RowEditError> {
        self.require("remove-at", index + 1)?;
        Ok(self.keys.remove(index))
    }

    /// Applies one edit after checking its precondition.
    ///
    /// Returns the key taken out of the row by `ReplaceAt` and `RemoveAt`.
    pub fn apply(&mut self, edit: RowEdit) -> Result<Option<Key>, RowEditError> {
        match edit {
            RowEdit::InsertAt(index, key) => self.insert_at(index, key).map(|()| None),
            RowEdit::Append(key) => {
                self.append(key);
                Ok(None)
            }
            RowEdit::ReplaceAt(index, key) => self.replace_at(index, key).map(Some),
            RowEdit::RemoveAt(index) => self.remove_at(index).map(Some),
        }
    }

    fn require(&self, edit: &'static str, needed: usize) -> Result<(), RowEditError> {
        if self.keys.len() < needed {
            return Err(RowEditError {
                edit,
                needed,
                len: self.keys.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<Key>> for Row {
    fn from(keys: Vec<Key>) -> Self {
        Self::new(keys)
    }
}

/// One modifier state of the keyboard and its full key mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Modifier combination: "" (unmodified), "shift", or the raw modifiers string
    #[serde(rename = "level")]
    pub tag: String,
    /// Activation mode
    pub mode: LevelMode,
    /// Rows from top to bottom
    pub rows: Vec<Row>,
}

impl Level {
    /// Creates a level without rows.
    pub fn new(tag: impl Into<String>, mode: LevelMode) -> Self {
        Self {
            tag: tag.into(),
            mode,
            rows: Vec::new(),
        }
    }

    /// Total number of keys across all rows.
    pub fn key_count(&self) -> usize {
        self.rows.iter().map(Row::len).sum()
    }
}

/// A keyboard layout converted from one CLDR document.
///
/// # Serialization
///
/// [`Layout::to_json_pretty`] produces the artifact format: keys sorted,
/// two-space indentation, non-ASCII characters written as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Locale from the `keyboard` element, without the `-t-` extension
    #[serde(rename = "locale")]
    pub locale_id: String,
    /// Human-readable name from the `name` element
    #[serde(rename = "name")]
    pub display_name: String,
    /// Levels in document order
    pub levels: Vec<Level>,
}

impl Layout {
    /// Creates an empty layout.
    pub fn new(locale_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            locale_id: locale_id.into(),
            display_name: display_name.into(),
            levels: Vec::new(),
        }
    }

    /// Finds a level by tag.
    pub fn level(&self, tag: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.tag == tag)
    }

    /// Finds a level by tag for modification.
    pub fn level_mut(&mut self, tag: &str) -> Option<&mut Level> {
        self.levels.iter_mut().find(|level| level.tag == tag)
    }

    /// Returns the position of the level with `tag`.
    pub fn level_index(&self, tag: &str) -> Option<usize> {
        self.levels.iter().position(|level| level.tag == tag)
    }

    /// Serializes to pretty JSON with sorted object keys.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        // serde_json::Map is ordered by key unless `preserve_order` is enabled
        let value = serde_json::to_value(self)?;
        serde_json::to_string_pretty(&value)
    }

    /// Parses a layout from its JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeyAction;

    fn row_of(labels: &[&str]) -> Row {
        labels.iter().map(|s| Key::text(*s)).collect::<Vec<_>>().into()
    }

    fn primaries(row: &Row) -> Vec<&str> {
        row.keys().iter().filter_map(Key::primary).collect()
    }

    #[test]
    fn test_row_edits() {
        let mut row = row_of(&["a", "b", "c"]);

        assert_eq!(row.apply(RowEdit::InsertAt(0, Key::text("x"))), Ok(None));
        assert_eq!(primaries(&row), ["x", "a", "b", "c"]);

        let old = row.apply(RowEdit::ReplaceAt(1, Key::text("y"))).unwrap();
        assert_eq!(old.unwrap().primary(), Some("a"));

        let removed = row.apply(RowEdit::RemoveAt(3)).unwrap();
        assert_eq!(removed.unwrap().primary(), Some("c"));

        row.apply(RowEdit::Append(Key::action(KeyAction::Delete)))
            .unwrap();
        assert_eq!(row.len(), 4);
        assert!(row.get(3).unwrap().is(KeyAction::Delete));
    }

    #[test]
    fn test_insert_at_end_is_allowed() {
        let mut row = row_of(&["a"]);
        assert!(row.apply(RowEdit::InsertAt(1, Key::text("b"))).is_ok());
        assert_eq!(primaries(&row), ["a", "b"]);
    }

    #[test]
    fn test_row_edit_preconditions() {
        let mut row = row_of(&["a", "b"]);

        let err = row.apply(RowEdit::RemoveAt(2)).unwrap_err();
        assert_eq!(err.edit, "remove-at");
        assert_eq!(err.needed, 3);
        assert_eq!(err.len, 2);

        assert!(row.apply(RowEdit::ReplaceAt(5, Key::text("z"))).is_err());
        assert!(row.apply(RowEdit::InsertAt(3, Key::text("z"))).is_err());
        // failed edits leave the row untouched
        assert_eq!(primaries(&row), ["a", "b"]);
    }

    #[test]
    fn test_level_lookup() {
        let mut layout = Layout::new("de", "German");
        layout.levels.push(Level::new(LEVEL_DEFAULT, LevelMode::Default));
        layout.levels.push(Level::new(LEVEL_SHIFT, LevelMode::Latched));

        assert_eq!(layout.level_index(LEVEL_SHIFT), Some(1));
        assert!(layout.level(LEVEL_OPT).is_none());
        layout.level_mut(LEVEL_DEFAULT).unwrap().rows.push(row_of(&["q"]));
        assert_eq!(layout.levels[0].key_count(), 1);
    }

    #[test]
    fn test_json_keys_are_sorted() {
        let mut layout = Layout::new("de", "German");
        let mut level = Level::new(LEVEL_DEFAULT, LevelMode::Default);
        level.rows.push(row_of(&["ü"]));
        layout.levels.push(level);

        let json = layout.to_json_pretty().unwrap();
        let levels_at = json.find("\"levels\"").unwrap();
        let locale_at = json.find("\"locale\"").unwrap();
        let name_at = json.find("\"name\"").unwrap();
        assert!(levels_at < locale_at && locale_at < name_at);

        let level_at = json.find("\"level\"").unwrap();
        let mode_at = json.find("\"mode\"").unwrap();
        let rows_at = json.find("\"rows\"").unwrap();
        assert!(level_at < mode_at && mode_at < rows_at);

        assert!(json.contains("\"ü\""), "non-ASCII must be written verbatim");
        assert!(json.contains("\"mode\": \"default\""));
        assert!(!json.ends_with('\n'));
    }

    #[test]
    fn test_json_round_trip() {
        let mut layout = Layout::new("fr", "French");
        let mut level = Level::new("opt", LevelMode::Locked);
        level.rows.push(row_of(&["1", "2"]));
        level.rows.push(vec![Key::level_switch(0).with_label("ABC").with_width(1.5)].into());
        layout.levels.push(level);

        let json = layout.to_json_pretty().unwrap();
        assert_eq!(Layout::from_json(&json).unwrap(), layout);
    }
}
