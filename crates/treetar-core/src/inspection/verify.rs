//! Artifact checksum verification.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::ArchiveError;
use crate::Result;
use crate::io::Checksum;
use crate::io::HashingWriter;

/// Result of comparing an artifact's digest with an expected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// Expected digest as given, lowercased.
    pub expected: String,
    /// Digest of the file.
    pub actual: Checksum,
    /// Whether the two agree.
    pub matches: bool,
}

/// Computes the SHA-256 of an existing file in one streamed pass.
///
/// # Errors
///
/// Returns [`ArchiveError::NotFound`] or [`ArchiveError::AccessDenied`] if
/// the file cannot be opened, [`ArchiveError::Io`] if reading fails.
///
/// # Examples
///
/// ```no_run
/// use treetar_core::checksum_file;
///
/// let checksum = checksum_file("/tmp/treetar-abc.tar")?;
/// println!("{checksum}");
/// # Ok::<(), treetar_core::ArchiveError>(())
/// ```
pub fn checksum_file<P: AsRef<Path>>(path: P) -> Result<Checksum> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| ArchiveError::from_io(e, path))?;
    let mut sink = HashingWriter::new(io::sink());
    io::copy(&mut file, &mut sink)?;
    let (_, checksum, _) = sink.finish();
    Ok(checksum)
}

/// Checks an artifact against an expected hex digest.
///
/// A digest of the wrong length or with non-hex characters never matches;
/// it is reported in the outcome rather than as an error.
///
/// # Errors
///
/// Same as [`checksum_file`].
///
/// # Examples
///
/// ```no_run
/// use treetar_core::verify_artifact;
///
/// let outcome = verify_artifact("/tmp/treetar-abc.tar", "9f86d081884c7d65...")?;
/// if !outcome.matches {
///     eprintln!("expected {}, got {}", outcome.expected, outcome.actual);
/// }
/// # Ok::<(), treetar_core::ArchiveError>(())
/// ```
pub fn verify_artifact<P: AsRef<Path>>(path: P, expected: &str) -> Result<VerifyOutcome> {
    let actual = checksum_file(path)?;
    let matches = Checksum::from_hex(expected) == Some(actual);
    Ok(VerifyOutcome {
        expected: expected.trim().to_ascii_lowercase(),
        actual,
        matches,
    })
}
