//! Diagnostic output.
//!
//! Events go to stderr so that the per-file summaries on stdout stay clean.
//! `RUST_LOG` takes precedence; otherwise `--verbose` or a `DEBUG`
//! environment variable turn on per-decision diagnostics.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that enables debug output like `--verbose`.
pub const DEBUG_ENV: &str = "DEBUG";

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool, debug_env: bool) -> &'static str {
    if verbose || debug_env {
        "debug"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. Call once, before any conversion.
pub fn init(verbose: bool) {
    let filter = default_filter(verbose, std::env::var_os(DEBUG_ENV).is_some());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
