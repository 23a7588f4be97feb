//! Service layer for the conversion pipeline.
//!
//! Each stage is a separate module: identifier resolution, the mobile and
//! terminal transformations, and the orchestrator that ties them to the
//! parser and the filesystem.

pub mod conversion;
pub mod identifiers;
pub mod mobile;
pub mod terminal;

// Re-export commonly used types and functions
pub use conversion::{
    find_sources, ArtifactKind, ArtifactReport, BatchSummary, ConversionError, ConversionReport,
    Converter, WriteOutcome,
};
pub use identifiers::{
    IdentifierResolver, LocaleOverride, MatchRule, OverrideTable, Resolution, ResolveError,
    RuleOutcome, RESOLUTION_RULES,
};
pub use mobile::{apply_mobile, to_mobile, TransformError};
pub use terminal::{apply_terminal_row, terminal_row, to_extended};
