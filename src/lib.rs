//! CLDR keyboard converter library
//!
//! This library converts CLDR keyboard XML documents into on-screen keyboard
//! JSON layouts: the layout as parsed, a touchscreen variant with action
//! keys, and an extended variant with a terminal control row. Output files
//! are named after the keyboard identifier resolved from the layout's locale
//! and display name.

// Module declarations
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod logging;
pub mod models;
pub mod parser;
pub mod services;
