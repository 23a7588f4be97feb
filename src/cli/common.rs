//! Error and exit-code types shared by CLI commands.

use std::fmt;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Everything converted
    Success = 0,
    /// Missing or invalid arguments
    Usage = 1,
    /// Configuration, catalog or filesystem failure before conversion
    Io = 2,
    /// At least one input could not be converted
    ConversionFailed = 3,
}

impl ExitCode {
    /// Numeric code passed to the OS.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// A failed CLI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code the process should terminate with
    pub kind: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// Invalid or missing arguments.
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Usage,
            message: message.into(),
        }
    }

    /// Configuration, catalog or filesystem failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Io,
            message: message.into(),
        }
    }

    /// One or more inputs failed to convert.
    pub fn conversion(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::ConversionFailed,
            message: message.into(),
        }
    }

    /// Exit code for this error.
    pub const fn exit_code(&self) -> i32 {
        self.kind.code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type of CLI commands.
pub type CliResult<T> = Result<T, CliError>;
