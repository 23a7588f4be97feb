//! CLDR keyboard XML parsing.
//!
//! Turns one CLDR keyboard document (the `*-t-k0-android.xml` flavour) into a
//! [`Layout`]. Parsing is best-effort: `map` entries with a malformed ISO
//! position or without an output are dropped with a warning, and the rest of
//! the document is still converted.
//!
//! # Document Shape
//!
//! ```xml
//! <keyboard locale="de-t-k0-android">
//!   <names><name value="German"/></names>
//!   <keyMap>
//!     <map iso="D01" to="q"/>
//!     <map iso="D03" to="e" longPress="é è \u{EA}"/>
//!   </keyMap>
//!   <keyMap modifiers="shift">...</keyMap>
//! </keyboard>
//! ```
//!
//! When `keyboard` or `name` elements repeat, the last occurrence in document
//! order wins.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Key, Layout, Level, LevelMode, Row, LEVEL_DEFAULT, LEVEL_SHIFT};

/// Separator between the locale and its transform extension (`de-t-k0-android`).
const TRANSFORM_MARKER: &str = "-t-";

static ESCAPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\u\{([0-9A-Fa-f]+?)\}").expect("escape pattern is valid"));

static ISO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-E])([0-9]+)$").expect("ISO pattern is valid"));

/// Errors that abort parsing of a whole document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The document is not well-formed XML
    #[error("XML error at byte {position}: {source}")]
    Xml {
        /// Reader position when the error was detected
        position: usize,
        /// Underlying XML error
        #[source]
        source: quick_xml::Error,
    },
    /// No `keyboard` element carries a `locale` attribute
    #[error("no keyboard element with a locale attribute")]
    MissingLocale,
    /// No `name` element carries a `value` attribute
    #[error("no name element with a value attribute")]
    MissingName,
}

/// Why a `map` entry was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `iso` does not look like a row letter A-E followed by a column number
    InvalidIso,
    /// `iso` attribute is absent
    MissingIso,
    /// `to` attribute is absent
    MissingOutput,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InvalidIso => "invalid ISO key name",
            Self::MissingIso => "missing ISO key name",
            Self::MissingOutput => "missing output",
        };
        f.write_str(text)
    }
}

/// A `map` entry that was dropped from the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Tag of the level the entry belonged to
    pub level: String,
    /// Raw `iso` attribute, if present
    pub iso: Option<String>,
    /// Why it was dropped
    pub reason: SkipReason,
}

/// Result of parsing one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// The converted layout
    pub layout: Layout,
    /// Entries that were dropped, in document order
    pub skipped: Vec<SkippedEntry>,
}

/// Ordered rules mapping a `modifiers` attribute to a level tag and mode.
///
/// The first rule that matches decides. Any modifier tokens besides `shift`
/// are discarded by [`ModifierRule::Shift`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierRule {
    /// No (or empty) `modifiers`: the default level
    Unmodified,
    /// A `shift` token: the latched shift level
    Shift,
    /// Anything else: a locked level tagged with the raw string
    Other,
}

const MODIFIER_RULES: [ModifierRule; 3] = [
    ModifierRule::Unmodified,
    ModifierRule::Shift,
    ModifierRule::Other,
];

impl ModifierRule {
    /// Applies this rule alone, returning `None` when it does not match.
    pub fn classify(self, modifiers: Option<&str>) -> Option<(String, LevelMode)> {
        let modifiers = modifiers.filter(|m| !m.is_empty());
        match (self, modifiers) {
            (Self::Unmodified, None) => Some((LEVEL_DEFAULT.to_string(), LevelMode::Default)),
            (Self::Shift, Some(m)) if m.split_whitespace().any(|token| token == "shift") => {
                Some((LEVEL_SHIFT.to_string(), LevelMode::Latched))
            }
            (Self::Other, Some(m)) => Some((m.to_string(), LevelMode::Locked)),
            _ => None,
        }
    }
}

/// Classifies a `keyMap` by its `modifiers` attribute.
pub fn classify_modifiers(modifiers: Option<&str>) -> (String, LevelMode) {
    MODIFIER_RULES
        .iter()
        .find_map(|rule| rule.classify(modifiers))
        .unwrap_or_else(|| (LEVEL_DEFAULT.to_string(), LevelMode::Default))
}

/// Decodes `\u{HEX}` escapes to the characters they name.
///
/// Escapes that do not name a Unicode scalar value are left verbatim.
pub fn decode_escapes(value: &str) -> String {
    ESCAPE_PATTERN
        .replace_all(value, |caps: &regex::Captures<'_>| {
            let decoded = u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32);
            match decoded {
                Some(c) => c.to_string(),
                None => {
                    warn!("invalid escape {} left as-is", &caps[0]);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Column number of an ISO key name, of any length.
///
/// Stored as decimal digits without leading zeros and ordered numerically,
/// so `D2` sorts before `D10` and arbitrarily long columns still compare.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IsoColumn {
    digits: String,
}

impl IsoColumn {
    /// Creates a column from ASCII decimal digits.
    fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Self {
            digits: digits.to_string(),
        }
    }

    /// Returns the column as a number, if it fits.
    pub fn as_u32(&self) -> Option<u32> {
        self.digits.parse().ok()
    }
}

impl From<u32> for IsoColumn {
    fn from(column: u32) -> Self {
        Self {
            digits: column.to_string(),
        }
    }
}

impl Ord for IsoColumn {
    fn cmp(&self, other: &Self) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl PartialOrd for IsoColumn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IsoColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

/// Splits an ISO key name (`E01`) into its row letter and column number.
pub fn parse_iso(iso: &str) -> Option<(char, IsoColumn)> {
    let caps = ISO_PATTERN.captures(iso)?;
    let row = caps[1].chars().next()?;
    Some((row, IsoColumn::from_digits(&caps[2])))
}

/// Builds the key for one `map` entry.
fn build_key(to: &str, long_press: Option<&str>) -> Key {
    let mut strings = vec![decode_escapes(to)];
    if let Some(long_press) = long_press {
        strings.extend(
            long_press
                .split(' ')
                .filter(|token| !token.is_empty())
                .map(decode_escapes),
        );
    }
    Key::character(strings)
}

/// Keys of one keymap, grouped by row letter until the keymap closes.
struct LevelBuilder {
    tag: String,
    mode: LevelMode,
    rows: BTreeMap<char, Vec<(IsoColumn, Key)>>,
}

impl LevelBuilder {
    fn new(modifiers: Option<&str>) -> Self {
        let (tag, mode) = classify_modifiers(modifiers);
        Self {
            tag,
            mode,
            rows: BTreeMap::new(),
        }
    }

    fn add(&mut self, row: char, column: IsoColumn, key: Key) {
        self.rows.entry(row).or_default().push((column, key));
    }

    /// Orders rows E to A (top to bottom) and keys by ascending column.
    fn finish(self) -> Level {
        let mut level = Level::new(self.tag, self.mode);
        for (_, mut keys) in self.rows.into_iter().rev() {
            keys.sort_by(|(a, _), (b, _)| a.cmp(b));
            level
                .rows
                .push(Row::new(keys.into_iter().map(|(_, key)| key).collect()));
        }
        level
    }
}

/// Reads an attribute value, resolving XML entities.
fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, quick_xml::Error> {
    match element.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Streaming state for one document.
#[derive(Default)]
struct DocumentState {
    locale: Option<String>,
    name: Option<String>,
    levels: Vec<Level>,
    open_level: Option<LevelBuilder>,
    skipped: Vec<SkippedEntry>,
}

impl DocumentState {
    fn on_element(&mut self, element: &BytesStart<'_>, is_empty: bool) -> Result<(), quick_xml::Error> {
        match element.local_name().as_ref() {
            b"keyboard" => {
                if let Some(locale) = attribute(element, "locale")? {
                    self.locale = Some(locale);
                }
            }
            b"name" => {
                if let Some(value) = attribute(element, "value")? {
                    self.name = Some(value);
                }
            }
            b"keyMap" => {
                self.close_level();
                let modifiers = attribute(element, "modifiers")?;
                let builder = LevelBuilder::new(modifiers.as_deref());
                if is_empty {
                    self.levels.push(builder.finish());
                } else {
                    self.open_level = Some(builder);
                }
            }
            b"map" => {
                if self.open_level.is_some() {
                    let iso = attribute(element, "iso")?;
                    let to = attribute(element, "to")?;
                    let long_press = attribute(element, "longPress")?;
                    self.add_map(iso, to, long_press.as_deref());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn add_map(&mut self, iso: Option<String>, to: Option<String>, long_press: Option<&str>) {
        let Some(level) = self.open_level.as_mut() else {
            return;
        };

        let position = iso.as_deref().map(parse_iso);
        let reason = match (position, &to) {
            (None, _) => SkipReason::MissingIso,
            (Some(None), _) => SkipReason::InvalidIso,
            (Some(Some((row, column))), Some(to)) => {
                level.add(row, column, build_key(to, long_press));
                return;
            }
            (Some(Some(_)), None) => SkipReason::MissingOutput,
        };

        warn!(
            "{}: {} (level '{}')",
            reason,
            iso.as_deref().unwrap_or("<none>"),
            level.tag
        );
        self.skipped.push(SkippedEntry {
            level: level.tag.clone(),
            iso,
            reason,
        });
    }

    fn close_level(&mut self) {
        if let Some(builder) = self.open_level.take() {
            self.levels.push(builder.finish());
        }
    }

    fn finish(mut self) -> Result<ParsedDocument, ParseError> {
        self.close_level();

        let locale = self.locale.ok_or(ParseError::MissingLocale)?;
        let locale_id = match locale.split_once(TRANSFORM_MARKER) {
            Some((prefix, _)) => prefix.to_string(),
            None => locale,
        };
        let display_name = self.name.ok_or(ParseError::MissingName)?;

        Ok(ParsedDocument {
            layout: Layout {
                locale_id,
                display_name,
                levels: self.levels,
            },
            skipped: self.skipped,
        })
    }
}

/// Parses a CLDR keyboard document, reporting dropped entries.
pub fn parse_document(xml: &str) -> Result<ParsedDocument, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut state = DocumentState::default();
    let mut buf = Vec::new();

    loop {
        let result = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => state.on_element(e, false),
            Ok(Event::Empty(ref e)) => state.on_element(e, true),
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"keyMap" {
                    state.close_level();
                }
                Ok(())
            }
            Ok(Event::Eof) => break,
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        result.map_err(|source| ParseError::Xml {
            position: reader.buffer_position(),
            source,
        })?;
        buf.clear();
    }

    let document = state.finish()?;
    debug!(
        "parsed {} ({}): {} levels, {} entries skipped",
        document.layout.locale_id,
        document.layout.display_name,
        document.layout.levels.len(),
        document.skipped.len()
    );
    Ok(document)
}

/// Parses a CLDR keyboard document into a layout.
pub fn parse_cldr_str(xml: &str) -> Result<Layout, ParseError> {
    parse_document(xml).map(|document| document.layout)
}

/// Reads and parses a CLDR keyboard file.
pub fn parse_cldr_file(path: &Path) -> Result<ParsedDocument, ParseError> {
    let xml = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&xml)
}
