//! Configuration for archiving operations.

use crate::ArchiveError;
use crate::Result;
use std::path::PathBuf;

/// Default capacity of the buffered output sink.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// How per-entry header metadata is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Copy mode, uid, gid and mtime as reported by the filesystem.
    #[default]
    Complete,

    /// Copy mode only; uid, gid and mtime are written as zero.
    ///
    /// Two trees with identical names, contents, modes and link targets then
    /// produce byte-identical archives regardless of ownership or timestamps.
    Deterministic,
}

/// Configuration for archiving operations.
///
/// # Examples
///
/// ```
/// use treetar_core::ArchiveConfig;
/// use treetar_core::HeaderMode;
///
/// let config = ArchiveConfig::default()
///     .with_prefix("/layer")
///     .with_header_mode(HeaderMode::Deterministic);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Prefix prepended to every archive-relative entry name.
    ///
    /// Default: `"/"`.
    pub prefix: String,

    /// Header metadata policy.
    ///
    /// Default: [`HeaderMode::Complete`].
    pub header_mode: HeaderMode,

    /// Sort sibling entries by file name during traversal.
    ///
    /// Resolved roots are always sorted. Disabling this falls back to the
    /// order the operating system returns directory entries in, which makes
    /// the checksum filesystem-dependent.
    ///
    /// Default: `true`.
    pub sort_entries: bool,

    /// Directory in which the archive artifact is created.
    ///
    /// `None` uses the system temporary directory.
    ///
    /// Default: `None`.
    pub temp_dir: Option<PathBuf>,

    /// Capacity of the buffered output sink in bytes.
    ///
    /// Default: 64 KiB.
    pub buffer_size: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            prefix: "/".to_string(),
            header_mode: HeaderMode::Complete,
            sort_entries: true,
            temp_dir: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ArchiveConfig {
    /// Creates a new `ArchiveConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the destination prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the header metadata policy.
    #[must_use]
    pub fn with_header_mode(mut self, mode: HeaderMode) -> Self {
        self.header_mode = mode;
        self
    }

    /// Sets whether siblings are sorted during traversal.
    #[must_use]
    pub fn with_sort_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    /// Sets the directory the artifact is created in.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Sets the output buffer capacity.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The prefix contains a NUL byte
    /// - The buffer size is zero
    pub fn validate(&self) -> Result<()> {
        if self.prefix.contains('\0') {
            return Err(ArchiveError::InvalidConfiguration {
                reason: "prefix must not contain NUL bytes".to_string(),
            });
        }
        if self.buffer_size == 0 {
            return Err(ArchiveError::InvalidConfiguration {
                reason: "buffer size must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
