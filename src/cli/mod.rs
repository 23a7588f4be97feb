//! CLI command handlers.

pub mod common;
pub mod convert;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use convert::ConvertArgs;
