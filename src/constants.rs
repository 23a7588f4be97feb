//! Application-wide constants.

/// The binary name of the application (used in usage messages and the config directory).
pub const APP_BINARY_NAME: &str = "cldr2json";

/// File name suffix of CLDR android keyboard documents.
pub const DEFAULT_BATCH_SUFFIX: &str = "-t-k0-android.xml";
