//! Key definitions for on-screen keyboard rows.

use serde::{Deserialize, Serialize};

/// Keysym for Return, used by the enter key of mobile layouts.
pub const KEYVAL_RETURN: &str = "0xff0d";

/// Action performed by a non-character key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyAction {
    /// Switches the keyboard to another level (see [`Key::level`])
    LevelSwitch,
    /// Deletes the character before the cursor
    Delete,
    /// Opens the emoji picker
    Emoji,
    /// Latches a modifier keyval (Ctrl, Alt)
    Modifier,
}

/// A single key of an on-screen keyboard row.
///
/// Character keys carry `strings` (primary output first, long-press
/// alternates after it) or a `keyval`; action keys carry an `action`.
/// Every optional field is omitted from the serialized form when absent.
///
/// # Display precedence
///
/// `label` wins over `strings`: [`Key::with_label`] drops the strings of
/// a character key, matching what the renderer would display anyway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// Action for non-character keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<KeyAction>,
    /// Target level index of a level-switch key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
    /// Output strings: index 0 is the primary output, the rest are long-press alternates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strings: Option<Vec<String>>,
    /// X keysym emitted by the key, as a hex string (e.g. "0xff0d")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyval: Option<String>,
    /// Text label shown on the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Symbolic icon shown on the key
    #[serde(
        rename = "iconName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub icon_name: Option<String>,
    /// Relative key width (1.0 = a regular key)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "width_format::serialize"
    )]
    pub width: Option<f64>,
}

impl Key {
    /// Creates a character key from its primary output and long-press alternates.
    pub fn character(strings: Vec<String>) -> Self {
        Self {
            strings: Some(strings),
            ..Self::default()
        }
    }

    /// Creates a character key emitting a single string.
    pub fn text(value: impl Into<String>) -> Self {
        Self::character(vec![value.into()])
    }

    /// Creates a key emitting a keysym rather than text.
    pub fn keyval(keyval: impl Into<String>) -> Self {
        Self {
            keyval: Some(keyval.into()),
            ..Self::default()
        }
    }

    /// Creates an action key.
    pub fn action(action: KeyAction) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }

    /// Creates a key switching to the level at index `target`.
    pub fn level_switch(target: usize) -> Self {
        Self {
            level: Some(target),
            ..Self::action(KeyAction::LevelSwitch)
        }
    }

    /// Creates a modifier key latching `keyval`.
    pub fn modifier(keyval: impl Into<String>) -> Self {
        Self {
            keyval: Some(keyval.into()),
            ..Self::action(KeyAction::Modifier)
        }
    }

    /// Sets the label, dropping strings of character keys.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self.strings = None;
        self
    }

    /// Sets the symbolic icon.
    pub fn with_icon(mut self, icon_name: impl Into<String>) -> Self {
        self.icon_name = Some(icon_name.into());
        self
    }

    /// Sets the relative width.
    #[must_use]
    pub const fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Returns the primary output string, if this is a text key.
    pub fn primary(&self) -> Option<&str> {
        self.strings
            .as_ref()
            .and_then(|strings| strings.first())
            .map(String::as_str)
    }

    /// Returns the long-press alternates (empty for non-text keys).
    pub fn alternates(&self) -> &[String] {
        match self.strings.as_deref() {
            Some([_, rest @ ..]) => rest,
            _ => &[],
        }
    }

    /// Checks whether this key performs `action`.
    pub fn is(&self, action: KeyAction) -> bool {
        self.action == Some(action)
    }
}

/// Writes integral widths as integers (`4`) and the rest as decimals (`1.5`).
mod width_format {
    use serde::Serializer;

    #[allow(
        clippy::float_cmp,
        clippy::cast_possible_truncation,
        clippy::trivially_copy_pass_by_ref
    )]
    pub fn serialize<S>(width: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *width {
            Some(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                serializer.serialize_i64(value as i64)
            }
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_none(),
        }
    }
}
