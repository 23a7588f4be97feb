//! Conversion command: CLDR keyboard documents to layout JSON.

use crate::catalog::IdentifierCatalog;
use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use crate::services::{
    ConversionError, ConversionReport, Converter, IdentifierResolver, ResolveError,
    TransformError,
};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Convert CLDR keyboard XML files to on-screen keyboard JSON
#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// CLDR keyboard file, or a directory of `*-t-k0-android.xml` files
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Directory receiving the JSON layouts
    #[arg(value_name = "DESTINATION")]
    pub destination: Option<PathBuf>,

    /// Identifier catalog: XKB registry (evdev.xml) or JSON {identifier: name}
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Configuration file (default: <config dir>/cldr2json/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log every resolution and skip decision to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConvertArgs {
    /// Execute the conversion
    pub fn execute(&self) -> CliResult<()> {
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| CliError::usage("supply a CLDR keyboard file"))?;
        let destination = self
            .destination
            .as_deref()
            .ok_or_else(|| CliError::usage("supply an output directory"))?;

        if !source.exists() {
            return Err(CliError::io(format!(
                "Source not found: {}",
                source.display()
            )));
        }

        let config = self.load_config()?;
        let converter = Converter::new(self.build_resolver(&config)?, destination);
        fs::create_dir_all(destination).map_err(|e| {
            CliError::io(format!(
                "Failed to create output directory {}: {e}",
                destination.display()
            ))
        })?;

        if source.is_dir() {
            convert_directory(&converter, source, &config.batch.suffix)
        } else {
            let report = converter
                .convert_file(source)
                .map_err(|e| CliError::conversion(format!("{}: {e}", source.display())))?;
            print_report(&report);
            Ok(())
        }
    }

    fn load_config(&self) -> CliResult<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        };
        config.map_err(|e| CliError::io(format!("Failed to load configuration: {e:#}")))
    }

    fn build_resolver(&self, config: &Config) -> CliResult<IdentifierResolver> {
        let catalog_path = self.catalog.as_deref().unwrap_or(config.catalog.path.as_path());
        let catalog = IdentifierCatalog::load(catalog_path)
            .map_err(|e| CliError::io(format!("Failed to load identifier catalog: {e:#}")))?;
        if catalog.is_empty() {
            warn!("identifier catalog {} is empty", catalog_path.display());
        }
        info!(
            "loaded {} catalog entries from {}",
            catalog.len(),
            catalog_path.display()
        );
        Ok(IdentifierResolver::new(config.override_table(), catalog))
    }
}

fn convert_directory(converter: &Converter, dir: &Path, suffix: &str) -> CliResult<()> {
    let summary = converter.convert_directory(dir, suffix).map_err(|e| {
        CliError::io(format!("Failed to read source directory {}: {e}", dir.display()))
    })?;

    for report in &summary.converted {
        print_report(report);
    }
    println!(
        "\nConverted {} file(s), {} failed",
        summary.converted.len(),
        summary.failed.len()
    );

    if summary.is_success() {
        return Ok(());
    }

    for (path, err) in &summary.failed {
        let reason = match err {
            ConversionError::Resolve(ResolveError::Disabled { .. }) => "disabled",
            ConversionError::Resolve(_) => "unresolved",
            ConversionError::Transform(TransformError::MissingLevel(_)) => {
                "unsupported levels"
            }
            ConversionError::Transform(_) => "unsupported rows",
            _ => "error",
        };
        eprintln!("  ✗ {} ({reason}): {err}", path.display());
    }
    Err(CliError::conversion(format!(
        "{} of {} file(s) failed",
        summary.failed.len(),
        summary.converted.len() + summary.failed.len()
    )))
}

fn print_report(report: &ConversionReport) {
    if report.skipped_entries.is_empty() {
        println!("{report}");
    } else {
        println!(
            "{report}, {} entries skipped",
            report.skipped_entries.len()
        );
    }
}
