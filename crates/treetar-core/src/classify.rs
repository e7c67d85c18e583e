//! Mapping of traversal entries to archive actions.
//!
//! Exclusions are explicit variants rather than flags so the lossy parts of
//! archiving are visible at the type level:
//!
//! - The top of a walked directory subtree is never written; the archive holds
//!   the *contents* of a directory, not the directory object itself.
//! - Pipes, sockets and device nodes are skipped without error. Their content
//!   has no portable byte representation and opening a FIFO for reading can
//!   block forever.

use crate::walker::FileKind;
use crate::walker::FilesystemEntry;
use crate::walker::SpecialKind;

/// Kind of entry written to the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file; content follows the header.
    Regular,
    /// Directory; header only.
    Directory,
    /// Symbolic link; header carries the raw target.
    Symlink,
}

/// Why an entry produced no archive record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The directory at the top of a walked subtree.
    WalkRoot,
    /// An unsupported special file.
    Special(SpecialKind),
}

/// Outcome of classifying one traversal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write an entry of the given kind.
    Include(EntryKind),
    /// Omit the entry silently.
    Skip(SkipReason),
}

/// Classifies a traversal entry.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use treetar_core::classify::{Action, EntryKind, SkipReason, classify};
/// use treetar_core::walker::{FileKind, FilesystemEntry, Ownership};
///
/// let entry = FilesystemEntry {
///     path: PathBuf::from("/srv/app/bin"),
///     relative_path: PathBuf::from("bin"),
///     depth: 1,
///     kind: FileKind::Directory,
///     size: 0,
///     ownership: Ownership::default(),
/// };
/// assert_eq!(classify(&entry), Action::Include(EntryKind::Directory));
///
/// let root = FilesystemEntry { depth: 0, ..entry };
/// assert_eq!(classify(&root), Action::Skip(SkipReason::WalkRoot));
/// ```
#[must_use]
pub fn classify(entry: &FilesystemEntry) -> Action {
    match &entry.kind {
        FileKind::Directory if entry.is_root() => Action::Skip(SkipReason::WalkRoot),
        FileKind::Directory => Action::Include(EntryKind::Directory),
        FileKind::Regular => Action::Include(EntryKind::Regular),
        FileKind::Symlink { .. } => Action::Include(EntryKind::Symlink),
        FileKind::Special(kind) => Action::Skip(SkipReason::Special(*kind)),
    }
}
