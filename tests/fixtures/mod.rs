//! Shared test fixtures for conversion and CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// CLDR row letters, top row first.
const ROW_LETTERS: [char; 5] = ['E', 'D', 'C', 'B', 'A'];

/// Escapes a value for use inside a double-quoted XML attribute.
pub fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Builds a `keyMap` element from rows of outputs, top row first.
///
/// Rows are assigned ISO row letters bottom-up: the last row is `A`, the
/// one above it `B`, and so on. `modifiers` of `None` omits the attribute.
pub fn key_map(modifiers: Option<&str>, rows: &[&[&str]]) -> String {
    let attr = modifiers
        .map(|m| format!(r#" modifiers="{m}""#))
        .unwrap_or_default();
    let first_letter = ROW_LETTERS.len() - rows.len();

    let mut maps = String::new();
    for (row_index, row) in rows.iter().enumerate() {
        let letter = ROW_LETTERS[first_letter + row_index];
        for (column, to) in row.iter().enumerate() {
            maps.push_str(&format!(
                r#"<map iso="{letter}{:02}" to="{}"/>"#,
                column + 1,
                xml_escape(to)
            ));
        }
    }
    format!("<keyMap{attr}>{maps}</keyMap>")
}

/// Builds a complete CLDR keyboard document.
pub fn cldr_document(locale: &str, name: &str, key_maps: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE keyboard SYSTEM "../dtd/ldmlKeyboard.dtd">
<keyboard locale="{locale}">
    <version platform="4.4" number="1"/>
    <names>
        <name value="{name}"/>
    </names>
    {}
</keyboard>"#,
        key_maps.join("\n    ")
    )
}

/// German letter rows, unmodified.
pub const GERMAN_LOWER: &[&[&str]] = &[
    &["q", "w", "e", "r", "t", "z", "u", "i", "o", "p", "ü"],
    &["a", "s", "d", "f", "g", "h", "j", "k", "l", "ö", "ä"],
    &["y", "x", "c", "v", "b", "n", "m"],
    &[",", " ", "."],
];

/// German letter rows, shifted.
pub const GERMAN_UPPER: &[&[&str]] = &[
    &["Q", "W", "E", "R", "T", "Z", "U", "I", "O", "P", "Ü"],
    &["A", "S", "D", "F", "G", "H", "J", "K", "L", "Ö", "Ä"],
    &["Y", "X", "C", "V", "B", "N", "M"],
    &[",", " ", "."],
];

/// German android document with only the unmodified level.
pub fn german_document() -> String {
    cldr_document(
        "de-t-k0-android",
        "German",
        &[key_map(None, GERMAN_LOWER)],
    )
}

/// German android document with unmodified and shift levels.
pub fn german_document_with_shift() -> String {
    cldr_document(
        "de-t-k0-android",
        "German",
        &[
            key_map(None, GERMAN_LOWER),
            key_map(Some("shift"), GERMAN_UPPER),
        ],
    )
}

/// English android document with letter and symbol levels.
pub fn english_document() -> String {
    cldr_document(
        "en-t-k0-android",
        "English",
        &[
            key_map(
                None,
                &[
                    &["q", "w", "e", "r", "t", "y", "u", "i", "o", "p"],
                    &["a", "s", "d", "f", "g", "h", "j", "k", "l"],
                    &["z", "x", "c", "v", "b", "n", "m"],
                    &[",", " ", "."],
                ],
            ),
            key_map(
                Some("shift"),
                &[
                    &["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P"],
                    &["A", "S", "D", "F", "G", "H", "J", "K", "L"],
                    &["Z", "X", "C", "V", "B", "N", "M"],
                    &[",", " ", "."],
                ],
            ),
            key_map(
                Some("opt"),
                &[
                    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"],
                    &["@", "#", "$", "%", "&", "-", "+", "(", ")"],
                    &["*", "\"", "'", ":", ";", "!", "?"],
                    &["_", "/", " ", ",", "."],
                ],
            ),
            key_map(
                Some("opt+shift"),
                &[
                    &["~", "`", "|", "•", "√", "π", "÷", "×", "¶", "∆"],
                    &["£", "¢", "€", "¥", "^", "°", "=", "{", "}"],
                    &["\\", "©", "®", "™", "℅", "[", "]"],
                    &["<", ">", " ", ",", "."],
                ],
            ),
        ],
    )
}

/// Writes `xml` into `dir` under `file_name`.
pub fn write_document(dir: &Path, file_name: &str, xml: &str) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, xml).expect("Failed to write document");
    path
}

/// Writes a JSON catalog of `(identifier, display name)` pairs.
pub fn write_catalog(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let map: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(id, name)| ((*id).to_string(), serde_json::Value::from(*name)))
        .collect();
    let path = dir.join("catalog.json");
    fs::write(&path, serde_json::to_string(&map).expect("Failed to serialize catalog"))
        .expect("Failed to write catalog");
    path
}

/// Catalog entries used by most tests.
pub const CATALOG: &[(&str, &str)] = &[
    ("de", "German"),
    ("fr", "French"),
    ("gb", "English (UK)"),
    ("us", "English (US)"),
    ("za", "Zulu"),
];

/// A workspace with `in/`, `out/` and a catalog.
pub struct Workspace {
    /// Keeps the directory alive
    pub temp: TempDir,
    /// Source documents
    pub input: PathBuf,
    /// Conversion output
    pub output: PathBuf,
    /// JSON catalog
    pub catalog: PathBuf,
}

/// Creates a [`Workspace`] with the default catalog.
pub fn workspace() -> Workspace {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let input = temp.path().join("in");
    let output = temp.path().join("out");
    fs::create_dir(&input).expect("Failed to create input dir");
    fs::create_dir(&output).expect("Failed to create output dir");
    let catalog = write_catalog(temp.path(), CATALOG);
    Workspace {
        temp,
        input,
        output,
        catalog,
    }
}
