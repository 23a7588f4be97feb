//! Conversion orchestration.
//!
//! One CLDR document yields up to three artifacts in the destination
//! directory, written in this order:
//!
//! 1. `<identifier>.json`: the parsed layout
//! 2. `<identifier>-mobile.json`: the mobile variant
//! 3. `<identifier>-extended-mobile.json`: the mobile variant with a terminal row
//!
//! Each stage resolves the identifier again and works on its own copy of the
//! layout. Existing artifacts are never overwritten; only their existence is
//! checked.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::Layout;
use crate::parser::{self, ParseError, SkippedEntry};
use crate::services::identifiers::{IdentifierResolver, ResolveError};
use crate::services::mobile::{self, TransformError};
use crate::services::terminal;

/// Artifact variants produced per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Layout as parsed
    Desktop,
    /// Touchscreen variant
    Mobile,
    /// Touchscreen variant with terminal keys
    ExtendedMobile,
}

impl ArtifactKind {
    /// All variants in write order.
    pub const ALL: [Self; 3] = [Self::Desktop, Self::Mobile, Self::ExtendedMobile];

    /// File name of this artifact for `identifier`.
    pub fn file_name(self, identifier: &str) -> String {
        match self {
            Self::Desktop => format!("{identifier}.json"),
            Self::Mobile => format!("{identifier}-mobile.json"),
            Self::ExtendedMobile => format!("{identifier}-extended-mobile.json"),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
            Self::ExtendedMobile => "extended-mobile",
        };
        f.write_str(name)
    }
}

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created
    Written,
    /// The file already existed and was left alone
    Skipped,
}

/// One artifact of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReport {
    /// Artifact variant
    pub kind: ArtifactKind,
    /// Destination path
    pub path: PathBuf,
    /// Whether it was written
    pub outcome: WriteOutcome,
}

/// Result of converting one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Source document
    pub source: PathBuf,
    /// Resolved keyboard identifier
    pub identifier: String,
    /// Artifacts in write order
    pub artifacts: Vec<ArtifactReport>,
    /// `map` entries dropped while parsing
    pub skipped_entries: Vec<SkippedEntry>,
}

impl ConversionReport {
    /// Number of artifacts that were created.
    pub fn written(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.outcome == WriteOutcome::Written)
            .count()
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}:", self.source.display(), self.identifier)?;
        for artifact in &self.artifacts {
            let state = match artifact.outcome {
                WriteOutcome::Written => "written",
                WriteOutcome::Skipped => "exists",
            };
            write!(f, " {} ({state})", artifact.kind)?;
        }
        Ok(())
    }
}

/// Failures that abandon the rest of a document's conversion.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The document could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// No identifier for the layout
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// The layout shape does not fit the mobile edits
    #[error("unsupported layout shape: {0}")]
    Transform(#[from] TransformError),
    /// The layout could not be serialized
    #[error("failed to serialize {kind} layout: {source}")]
    Serialize {
        /// Artifact being produced
        kind: ArtifactKind,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
    /// An artifact could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Converts CLDR documents into layout artifacts.
#[derive(Debug, Clone)]
pub struct Converter {
    resolver: IdentifierResolver,
    destination: PathBuf,
}

impl Converter {
    /// Creates a converter writing into `destination`.
    pub fn new(resolver: IdentifierResolver, destination: impl Into<PathBuf>) -> Self {
        Self {
            resolver,
            destination: destination.into(),
        }
    }

    /// Returns the destination directory.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Converts one document and writes its artifacts.
    ///
    /// # Arguments
    ///
    /// * `source` - Path to a CLDR keyboard XML document
    ///
    /// # Returns
    ///
    /// * `Ok(ConversionReport)` - All three stages ran; some artifacts may have been skipped
    /// * `Err(ConversionError)` - A stage failed; artifacts of earlier stages stay on disk
    pub fn convert_file(&self, source: &Path) -> Result<ConversionReport, ConversionError> {
        info!("parsing {}", source.display());
        let parsed = parser::parse_cldr_file(source)?;
        let desktop = parsed.layout;

        let mut artifacts = Vec::with_capacity(ArtifactKind::ALL.len());
        let identifier = self.resolve(&desktop)?;
        artifacts.push(self.emit(ArtifactKind::Desktop, &identifier, &desktop)?);

        let mobile = mobile::to_mobile(&desktop)?;
        let identifier = self.resolve(&mobile)?;
        artifacts.push(self.emit(ArtifactKind::Mobile, &identifier, &mobile)?);

        let extended = terminal::to_extended(&mobile);
        let identifier = self.resolve(&extended)?;
        artifacts.push(self.emit(ArtifactKind::ExtendedMobile, &identifier, &extended)?);

        Ok(ConversionReport {
            source: source.to_path_buf(),
            identifier,
            artifacts,
            skipped_entries: parsed.skipped,
        })
    }

    /// Converts every document in `dir` whose name ends with `suffix`.
    ///
    /// Failures are logged and collected; they never stop the batch.
    pub fn convert_directory(&self, dir: &Path, suffix: &str) -> io::Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        for source in find_sources(dir, suffix)? {
            match self.convert_file(&source) {
                Ok(report) => summary.converted.push(report),
                Err(err) => {
                    warn!("skipping {}: {}", source.display(), err);
                    summary.failed.push((source, err));
                }
            }
        }
        Ok(summary)
    }

    fn resolve(&self, layout: &Layout) -> Result<String, ResolveError> {
        let resolution = self
            .resolver
            .resolve(&layout.locale_id, &layout.display_name)
            .inspect_err(|err| warn!("{err}"))?;
        if resolution.rule.is_fallback() {
            debug!(
                "{} ({}) resolved by {:?} → {}",
                layout.locale_id, layout.display_name, resolution.rule, resolution.identifier
            );
        }
        Ok(resolution.identifier)
    }

    fn emit(
        &self,
        kind: ArtifactKind,
        identifier: &str,
        layout: &Layout,
    ) -> Result<ArtifactReport, ConversionError> {
        let path = self.destination.join(kind.file_name(identifier));
        let outcome = write_if_absent(&path, kind, layout)?;
        Ok(ArtifactReport {
            kind,
            path,
            outcome,
        })
    }
}

/// Results of a directory conversion.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Documents converted, in processing order
    pub converted: Vec<ConversionReport>,
    /// Documents that failed, with the reason
    pub failed: Vec<(PathBuf, ConversionError)>,
}

impl BatchSummary {
    /// Whether every document converted.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Lists files in `dir` whose names end with `suffix`, sorted by path.
pub fn find_sources(dir: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(suffix));
        if matches && entry.file_type()?.is_file() {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

fn write_if_absent(
    path: &Path,
    kind: ArtifactKind,
    layout: &Layout,
) -> Result<WriteOutcome, ConversionError> {
    if path.exists() {
        info!("{} already exists, skipping", path.display());
        return Ok(WriteOutcome::Skipped);
    }

    let json = layout
        .to_json_pretty()
        .map_err(|source| ConversionError::Serialize { kind, source })?;
    let write_error = |source: io::Error| ConversionError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            info!("{} already exists, skipping", path.display());
            return Ok(WriteOutcome::Skipped);
        }
        Err(err) => return Err(write_error(err)),
    };
    fill_new_file(file, path, &json).map_err(write_error)?;

    debug!("wrote {} layout to {}", kind, path.display());
    Ok(WriteOutcome::Written)
}

/// Writes `content` to a freshly created file, removing the file on failure
/// so that a truncated artifact is never mistaken for a finished one.
fn fill_new_file(mut file: impl Write, path: &Path, content: &str) -> io::Result<()> {
    let result = file
        .write_all(content.as_bytes())
        .and_then(|()| file.flush());
    if let Err(err) = result {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path) {
            warn!(
                "failed to remove incomplete {}: {}",
                path.display(),
                remove_err
            );
        }
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IdentifierCatalog;
    use crate::services::identifiers::OverrideTable;
    use tempfile::TempDir;

    const GERMAN: &str = r#"<keyboard locale="de-t-k0-android">
        <names><name value="German"/></names>
        <keyMap>
            <map iso="D01" to="q"/><map iso="D02" to="w"/><map iso="D03" to="e"/>
            <map iso="C01" to="a"/><map iso="C02" to="s"/>
            <map iso="B01" to="y"/><map iso="B02" to="x"/>
            <map iso="A01" to=","/><map iso="A02" to=" "/><map iso="A03" to="."/>
        </keyMap>
    </keyboard>"#;

    fn converter(destination: &Path, entries: &[(&str, &str)]) -> Converter {
        let resolver = IdentifierResolver::new(
            OverrideTable::builtin(),
            IdentifierCatalog::from_entries(entries.iter().copied()),
        );
        Converter::new(resolver, destination)
    }

    fn write_source(dir: &Path, name: &str, xml: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, xml).unwrap();
        path
    }

    #[test]
    fn test_artifact_file_names() {
        assert_eq!(ArtifactKind::Desktop.file_name("de"), "de.json");
        assert_eq!(ArtifactKind::Mobile.file_name("de"), "de-mobile.json");
        assert_eq!(
            ArtifactKind::ExtendedMobile.file_name("in+bolnagri"),
            "in+bolnagri-extended-mobile.json"
        );
    }

    #[test]
    fn test_convert_writes_three_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(temp_dir.path(), "de-t-k0-android.xml", GERMAN);
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = converter(&out, &[("de", "German")])
            .convert_file(&source)
            .unwrap();
        assert_eq!(report.identifier, "de");
        assert_eq!(report.written(), 3);
        for kind in ArtifactKind::ALL {
            assert!(out.join(kind.file_name("de")).exists(), "{kind} missing");
        }

        let desktop = Layout::from_json(&fs::read_to_string(out.join("de.json")).unwrap()).unwrap();
        assert_eq!(desktop.locale_id, "de");
        assert_eq!(desktop.levels[0].rows.len(), 4);

        let extended =
            Layout::from_json(&fs::read_to_string(out.join("de-extended-mobile.json")).unwrap())
                .unwrap();
        assert_eq!(extended.levels[0].rows.len(), 5);
        assert_eq!(extended.levels[0].rows[0], terminal::terminal_row());
    }

    #[test]
    fn test_existing_artifacts_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(temp_dir.path(), "de-t-k0-android.xml", GERMAN);
        let out = temp_dir.path().to_path_buf();
        fs::write(out.join("de-mobile.json"), "keep me").unwrap();

        let report = converter(&out, &[("de", "German")])
            .convert_file(&source)
            .unwrap();
        let outcomes: Vec<_> = report.artifacts.iter().map(|a| a.outcome).collect();
        assert_eq!(
            outcomes,
            [WriteOutcome::Written, WriteOutcome::Skipped, WriteOutcome::Written]
        );
        assert_eq!(fs::read_to_string(out.join("de-mobile.json")).unwrap(), "keep me");
    }

    #[test]
    fn test_unresolved_layout_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(temp_dir.path(), "de-t-k0-android.xml", GERMAN);
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let err = converter(&out, &[("fr", "French")])
            .convert_file(&source)
            .unwrap_err();
        assert!(matches!(err, ConversionError::Resolve(ResolveError::NotFound { .. })));
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_transform_failure_keeps_desktop_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let xml = r#"<keyboard locale="de"><name value="German"/>
            <keyMap><map iso="D01" to="q"/></keyMap></keyboard>"#;
        let source = write_source(temp_dir.path(), "de-t-k0-android.xml", xml);
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let err = converter(&out, &[("de", "German")])
            .convert_file(&source)
            .unwrap_err();
        assert!(matches!(err, ConversionError::Transform(_)));
        assert!(err.to_string().starts_with("unsupported layout shape"));
        assert!(out.join("de.json").exists());
        assert!(!out.join("de-mobile.json").exists());
    }

    /// Accepts a few bytes, then fails like a full disk.
    struct FullDisk {
        accepted: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.accepted >= 8 {
                return Err(io::Error::other("no space left on device"));
            }
            let n = buf.len().min(8 - self.accepted);
            self.accepted += n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_removes_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("de.json");
        fs::write(&path, "{\n  \"lev").unwrap();

        let err = fill_new_file(FullDisk { accepted: 0 }, &path, "{\"levels\": []}").unwrap_err();
        assert_eq!(err.to_string(), "no space left on device");
        assert!(!path.exists());
    }

    #[test]
    fn test_successful_write_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("de.json");
        let file = fs::File::create(&path).unwrap();

        fill_new_file(file, &path, "{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_find_sources_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["fr-t-k0-android.xml", "de-t-k0-android.xml", "de-t-k0-windows.xml"] {
            write_source(temp_dir.path(), name, "");
        }
        fs::create_dir(temp_dir.path().join("x-t-k0-android.xml")).unwrap();

        let sources = find_sources(temp_dir.path(), "-t-k0-android.xml").unwrap();
        let names: Vec<_> = sources
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["de-t-k0-android.xml", "fr-t-k0-android.xml"]);
    }

    #[test]
    fn test_directory_batch_continues_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        let out = temp_dir.path().join("out");
        fs::create_dir(&input).unwrap();
        fs::create_dir(&out).unwrap();
        write_source(&input, "de-t-k0-android.xml", GERMAN);
        write_source(
            &input,
            "zu-t-k0-android.xml",
            &GERMAN.replace("de-t-k0-android", "zu").replace("German", "Zulu"),
        );
        write_source(&input, "broken-t-k0-android.xml", "<keyboard");

        let summary = converter(&out, &[("de", "German"), ("za", "Zulu")])
            .convert_directory(&input, "-t-k0-android.xml")
            .unwrap();
        assert!(!summary.is_success());
        assert_eq!(summary.converted.len(), 1);
        assert_eq!(summary.failed.len(), 2);
        assert!(summary
            .failed
            .iter()
            .any(|(_, err)| matches!(err, ConversionError::Resolve(ResolveError::Disabled { .. }))));
    }
}
