//! Error types for archiving operations.

use std::io;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while producing or inspecting an archive.
///
/// Skipped special files (pipes, sockets, device nodes) are never reported
/// through this type; they are omitted from the archive without error.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// A literal source path does not exist.
    #[error("source not found: {path}")]
    NotFound {
        /// The path that could not be found.
        path: PathBuf,
    },

    /// A stat, directory read or open failed due to permissions.
    #[error("access denied: {path}")]
    AccessDenied {
        /// The path that could not be accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The source glob pattern is malformed.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as supplied by the caller.
        pattern: String,
        /// Why the pattern was rejected.
        reason: String,
    },

    /// I/O operation failed (temporary file creation, write, flush).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration values are invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for the configuration error.
        reason: String,
    },

    /// An existing artifact could not be parsed during inspection.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),
}

impl ArchiveError {
    /// Classifies an I/O error raised while touching `path`.
    ///
    /// `NotFound` and `PermissionDenied` keep the path so callers can report
    /// which entry failed; every other kind becomes [`ArchiveError::Io`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    /// use treetar_core::ArchiveError;
    ///
    /// let err = io::Error::from(io::ErrorKind::PermissionDenied);
    /// let err = ArchiveError::from_io(err, "/root/secret");
    /// assert_eq!(err.code(), "ACCESS_DENIED");
    /// ```
    pub fn from_io(err: io::Error, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::AccessDenied { path, source: err },
            _ => Self::Io(io::Error::new(
                err.kind(),
                format!("{}: {err}", path.display()),
            )),
        }
    }

    /// Converts a traversal error reported by `walkdir`.
    pub(crate) fn from_walk(err: walkdir::Error, root: &Path) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        match err.into_io_error() {
            Some(io_err) => Self::from_io(io_err, path),
            None => Self::Io(io::Error::other(format!(
                "traversal failed at {}",
                path.display()
            ))),
        }
    }

    /// Returns a stable, machine-readable identifier for the error kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use treetar_core::ArchiveError;
    ///
    /// let err = ArchiveError::NotFound {
    ///     path: "/missing".into(),
    /// };
    /// assert_eq!(err.code(), "NOT_FOUND");
    /// ```
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AccessDenied { .. } => "ACCESS_DENIED",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::Io(_) => "IO_ERROR",
            Self::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            Self::InvalidArchive(_) => "INVALID_ARCHIVE",
        }
    }

    /// Returns the filesystem path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path } | Self::AccessDenied { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Returns `true` if the error is [`ArchiveError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the error is [`ArchiveError::AccessDenied`].
    #[must_use]
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}
