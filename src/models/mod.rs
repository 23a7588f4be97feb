//! Data models for on-screen keyboard layouts.
//!
//! This module contains the layout, level, row and key structures shared by
//! the parser, the mobile transforms and the JSON writer. Models are
//! independent of file formats and I/O.

pub mod key;
pub mod layout;

// Re-export all model types
pub use key::{Key, KeyAction, KEYVAL_RETURN};
pub use layout::{
    Layout, Level, LevelMode, Row, RowEdit, RowEditError, LEVEL_DEFAULT, LEVEL_OPT,
    LEVEL_OPT_SHIFT, LEVEL_SHIFT,
};
