//! Artifact listing implementation.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use crate::ArchiveError;
use crate::Result;

/// Kind of a listed archive record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestEntryKind {
    /// Regular file.
    Regular,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Any other type flag, carried as its raw byte.
    Other(u8),
}

impl ManifestEntryKind {
    fn from_tar(entry_type: tar::EntryType) -> Self {
        match entry_type {
            tar::EntryType::Regular | tar::EntryType::Continuous => Self::Regular,
            tar::EntryType::Directory => Self::Directory,
            tar::EntryType::Symlink => Self::Symlink,
            other => Self::Other(other.as_byte()),
        }
    }
}

impl std::fmt::Display for ManifestEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regular => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
            Self::Symlink => f.write_str("symlink"),
            Self::Other(flag) => write!(f, "other({})", char::from(*flag)),
        }
    }
}

/// One record of an archive as read back by a standard tar reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Full entry name, long-name extensions applied.
    pub name: String,
    /// Record kind.
    pub kind: ManifestEntryKind,
    /// Mode bits.
    pub mode: u32,
    /// Owning user id.
    pub uid: u64,
    /// Owning group id.
    pub gid: u64,
    /// Modification time, seconds since the epoch.
    pub mtime: u64,
    /// Content size in bytes.
    pub size: u64,
    /// Link target for symlinks.
    pub link_target: Option<String>,
}

/// Lists the records of an archive artifact.
///
/// Only headers are read; entry content is skipped over.
///
/// # Errors
///
/// Returns [`ArchiveError::NotFound`] or [`ArchiveError::AccessDenied`] if
/// the file cannot be opened, and [`ArchiveError::InvalidArchive`] if it is
/// not a well-formed tar stream.
///
/// # Examples
///
/// ```no_run
/// use treetar_core::list_artifact;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// for entry in list_artifact("/tmp/treetar-abc.tar")? {
///     println!("{:>10} {}", entry.size, entry.name);
/// }
/// # Ok(())
/// # }
/// ```
pub fn list_artifact<P: AsRef<Path>>(path: P) -> Result<Vec<ManifestEntry>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ArchiveError::from_io(e, path))?;
    list_entries(BufReader::new(file))
}

fn list_entries<R: Read>(reader: R) -> Result<Vec<ManifestEntry>> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| ArchiveError::InvalidArchive(format!("failed to read TAR entries: {e}")))?;

    let mut manifest = Vec::new();
    for entry_result in entries {
        let entry = entry_result
            .map_err(|e| ArchiveError::InvalidArchive(format!("failed to read TAR entry: {e}")))?;
        let header = entry.header();
        let invalid = |field: &str, e: std::io::Error| {
            ArchiveError::InvalidArchive(format!("invalid {field} field: {e}"))
        };

        manifest.push(ManifestEntry {
            name: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
            kind: ManifestEntryKind::from_tar(header.entry_type()),
            mode: header.mode().map_err(|e| invalid("mode", e))?,
            uid: header.uid().map_err(|e| invalid("uid", e))?,
            gid: header.gid().map_err(|e| invalid("gid", e))?,
            mtime: header.mtime().map_err(|e| invalid("mtime", e))?,
            size: entry.size(),
            link_target: entry
                .link_name_bytes()
                .map(|target| String::from_utf8_lossy(&target).into_owned()),
        });
    }

    Ok(manifest)
}
