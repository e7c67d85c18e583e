//! Error conversion utilities for CLI.
//!
//! Converts treetar-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use treetar_core::ArchiveError;

/// Converts `ArchiveError` to user-friendly anyhow error with context
pub fn convert_archive_error(err: ArchiveError, subject: &str) -> anyhow::Error {
    match err {
        ArchiveError::NotFound { path } => {
            anyhow!(
                "Path not found while processing '{subject}': {}\n\
                 HINT: Check the path, or quote a glob pattern so the shell does not expand it.",
                path.display()
            )
        }
        ArchiveError::AccessDenied { path, source } => {
            anyhow!(
                "Permission denied while processing '{subject}': {} ({source})\n\
                 HINT: Every entry under the source must be readable; the archive is never \
                 written partially.",
                path.display()
            )
        }
        ArchiveError::InvalidPattern { pattern, reason } => {
            anyhow!(
                "Invalid glob pattern '{pattern}': {reason}\n\
                 HINT: Supported syntax is '*', '?' and '[...]', each matching within one path component."
            )
        }
        ArchiveError::InvalidConfiguration { reason } => {
            anyhow!("Invalid configuration: {reason}")
        }
        ArchiveError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{subject}': {reason}\n\
                 HINT: The archive may be corrupted or truncated."
            )
        }
        ArchiveError::Io(io_err) => {
            anyhow!("I/O error while processing '{subject}': {io_err}")
        }
    }
}

/// Adds context to a core result about the path or pattern it concerned
pub fn add_context<T>(result: Result<T, ArchiveError>, subject: &str) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, subject))
}
