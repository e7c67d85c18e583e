//! Archiving operation reporting.

use crate::classify::EntryKind;
use std::time::Duration;

/// Report of one archiving operation.
///
/// # Examples
///
/// ```
/// use treetar_core::ArchiveReport;
///
/// let mut report = ArchiveReport::default();
/// report.files_added = 10;
/// report.directories_added = 2;
/// report.special_files_skipped = 1;
///
/// assert_eq!(report.total_entries(), 12);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Number of roots the source resolved to.
    pub roots: usize,

    /// Number of regular files written.
    pub files_added: usize,

    /// Number of directories written (walk roots excluded).
    pub directories_added: usize,

    /// Number of symlinks written.
    pub symlinks_added: usize,

    /// Number of pipes, sockets and device nodes omitted.
    pub special_files_skipped: usize,

    /// Total regular-file content bytes written.
    pub content_bytes: u64,

    /// Total size of the archive stream, including headers and padding.
    pub archive_bytes: u64,

    /// Duration of the operation.
    pub duration: Duration,
}

impl ArchiveReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one written entry.
    pub fn record(&mut self, kind: EntryKind, size: u64) {
        match kind {
            EntryKind::Regular => {
                self.files_added += 1;
                self.content_bytes += size;
            }
            EntryKind::Directory => self.directories_added += 1,
            EntryKind::Symlink => self.symlinks_added += 1,
        }
    }

    /// Returns the number of entries written to the archive.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_added + self.symlinks_added
    }

    /// Returns the fraction of the archive taken by headers and padding.
    ///
    /// Returns 0.0 for an empty archive.
    ///
    /// # Examples
    ///
    /// ```
    /// use treetar_core::ArchiveReport;
    ///
    /// let mut report = ArchiveReport::new();
    /// report.content_bytes = 512;
    /// report.archive_bytes = 2048;
    /// assert_eq!(report.overhead_ratio(), 0.75);
    /// ```
    #[must_use]
    pub fn overhead_ratio(&self) -> f64 {
        if self.archive_bytes == 0 {
            return 0.0;
        }
        let overhead = self.archive_bytes.saturating_sub(self.content_bytes);
        overhead as f64 / self.archive_bytes as f64
    }
}
