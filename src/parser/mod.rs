//! Parsing of CLDR keyboard documents.
//!
//! This module handles reading keyboard descriptions in CLDR XML and turning
//! them into [`Layout`](crate::models::Layout)s ready for conversion.

pub mod cldr;

// Re-export commonly used functions
pub use cldr::{
    classify_modifiers, decode_escapes, parse_cldr_file, parse_cldr_str, parse_document,
    parse_iso, IsoColumn, ModifierRule, ParseError, ParsedDocument, SkipReason, SkippedEntry,
};
