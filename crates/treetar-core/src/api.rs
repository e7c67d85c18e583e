//! High-level public API for archive creation.
//!
//! Every entry point runs the same single pass: resolve the source into roots,
//! walk each root, classify and name every entry, and serialize it through a
//! hashing sink so the digest is ready the moment the end marker is written.

use crate::ArchiveError;
use crate::Result;
use crate::classify::Action;
use crate::classify::SkipReason;
use crate::classify::classify;
use crate::config::ArchiveConfig;
use crate::header::EntryHeader;
use crate::io::Checksum;
use crate::io::HashingWriter;
use crate::report::ArchiveReport;
use crate::resolve::resolve_roots;
use crate::walker::TreeWalker;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tempfile::NamedTempFile;

/// Prefix of artifact file names.
const ARTIFACT_PREFIX: &str = "treetar-";

/// Suffix of artifact file names.
const ARTIFACT_SUFFIX: &str = ".tar";

/// A finished archive on disk together with its digest.
///
/// The file belongs to the caller; nothing in this crate deletes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveArtifact {
    /// Path to the archive file.
    pub path: PathBuf,

    /// SHA-256 of the complete archive byte stream.
    pub checksum: Checksum,

    /// Statistics gathered while writing.
    pub report: ArchiveReport,
}

impl ArchiveArtifact {
    /// Returns the artifact path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the digest as lowercase hexadecimal.
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        self.checksum.to_hex()
    }

    /// Splits the artifact into `(path, hex digest)`.
    #[must_use]
    pub fn into_parts(self) -> (PathBuf, String) {
        let hex = self.checksum.to_hex();
        (self.path, hex)
    }
}

/// Archives `source` under `prefix` into a new temporary file.
///
/// `source` is a literal path or a glob pattern (`*`, `?`, `[...]`).
/// A pattern matching nothing produces a valid empty archive.
///
/// # Errors
///
/// Returns an error if:
/// - A literal source does not exist ([`ArchiveError::NotFound`])
/// - A pattern is malformed ([`ArchiveError::InvalidPattern`])
/// - An entry cannot be read ([`ArchiveError::AccessDenied`])
/// - The artifact cannot be created or written ([`ArchiveError::Io`])
///
/// No artifact is left on disk when an error is returned.
///
/// # Examples
///
/// ```no_run
/// use treetar_core::archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let artifact = archive("/srv/app", "/")?;
/// println!("{} {}", artifact.path.display(), artifact.checksum);
/// # Ok(())
/// # }
/// ```
pub fn archive(source: &str, prefix: &str) -> Result<ArchiveArtifact> {
    archive_with_config(source, &ArchiveConfig::default().with_prefix(prefix))
}

/// Archives `source` into a new temporary file using `config`.
///
/// The temporary file is created in `config.temp_dir` (or the system temp
/// directory) only after the source has resolved, and is removed again if any
/// later step fails.
///
/// # Errors
///
/// Same as [`archive`], plus [`ArchiveError::InvalidConfiguration`] when
/// `config` fails validation.
///
/// # Examples
///
/// ```no_run
/// use treetar_core::{ArchiveConfig, HeaderMode, archive_with_config};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ArchiveConfig::default()
///     .with_prefix("/app")
///     .with_header_mode(HeaderMode::Deterministic);
/// let artifact = archive_with_config("/srv/app/*.conf", &config)?;
/// println!("{} entries", artifact.report.total_entries());
/// # Ok(())
/// # }
/// ```
pub fn archive_with_config(source: &str, config: &ArchiveConfig) -> Result<ArchiveArtifact> {
    config.validate()?;
    let start = Instant::now();
    let roots = resolve_roots(source)?;

    let temp = create_artifact_file(config)?;
    let sink = BufWriter::with_capacity(config.buffer_size, temp);

    // On error the NamedTempFile is dropped here, which removes it.
    let (sink, checksum, mut report) = write_roots(&roots, config, sink)?;
    let temp = sink
        .into_inner()
        .map_err(|e| ArchiveError::Io(e.into_error()))?;
    temp.as_file().sync_all()?;

    let (file, path) = temp.keep().map_err(|e| ArchiveError::Io(e.error))?;
    drop(file);

    report.duration = start.elapsed();
    tracing::debug!(
        path = %path.display(),
        checksum = %checksum,
        entries = report.total_entries(),
        bytes = report.archive_bytes,
        "archive complete"
    );

    Ok(ArchiveArtifact {
        path,
        checksum,
        report,
    })
}

/// Archives `source` into an arbitrary writer.
///
/// Runs the same pipeline as [`archive_with_config`] without a temporary
/// file. The writer is flushed and returned with the digest and report.
///
/// # Errors
///
/// Same as [`archive_with_config`]; a failing writer yields
/// [`ArchiveError::Io`]. On any error the writer may already hold a prefix
/// of the stream. That prefix never ends with the end-of-archive marker, so
/// it is distinguishable from a finished archive.
///
/// # Examples
///
/// ```no_run
/// use treetar_core::{ArchiveConfig, archive_to_writer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (bytes, checksum, report) =
///     archive_to_writer("/etc/hosts", &ArchiveConfig::default(), Vec::new())?;
/// assert_eq!(bytes.len() as u64, report.archive_bytes);
/// println!("{checksum}");
/// # Ok(())
/// # }
/// ```
pub fn archive_to_writer<W: Write>(
    source: &str,
    config: &ArchiveConfig,
    writer: W,
) -> Result<(W, Checksum, ArchiveReport)> {
    config.validate()?;
    let start = Instant::now();
    let roots = resolve_roots(source)?;

    let (writer, checksum, mut report) = write_roots(&roots, config, writer)?;
    report.duration = start.elapsed();
    Ok((writer, checksum, report))
}

fn create_artifact_file(config: &ArchiveConfig) -> Result<NamedTempFile> {
    let dir = config.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
    tempfile::Builder::new()
        .prefix(ARTIFACT_PREFIX)
        .suffix(ARTIFACT_SUFFIX)
        .tempfile_in(&dir)
        .map_err(|e| ArchiveError::from_io(e, &dir))
}

/// Serializes every root into `writer`, in order, then the end marker.
fn write_roots<W: Write>(
    roots: &[PathBuf],
    config: &ArchiveConfig,
    writer: W,
) -> Result<(W, Checksum, ArchiveReport)> {
    let mut stream = crate::writer::StreamWriter::new(HashingWriter::new(writer));
    let mut report = ArchiveReport::new();
    report.roots = roots.len();

    for root in roots {
        tracing::debug!(root = %root.display(), "archiving root");

        for entry in TreeWalker::new(root, config).walk() {
            let entry = entry?;
            match classify(&entry) {
                Action::Include(kind) => {
                    let header = EntryHeader::build(&entry, kind, config)?;
                    tracing::trace!(name = %header.name, ?kind, size = header.size, "append");
                    stream.append_from_path(&header, &entry.path)?;
                    report.record(kind, header.size);
                }
                Action::Skip(SkipReason::Special(kind)) => {
                    tracing::debug!(path = %entry.path.display(), %kind, "skipping special file");
                    report.special_files_skipped += 1;
                }
                Action::Skip(SkipReason::WalkRoot) => {}
            }
        }
    }

    let mut hashing = stream.finish()?;
    hashing.flush()?;
    let (writer, checksum, total) = hashing.finish();
    report.archive_bytes = total;

    Ok((writer, checksum, report))
}
