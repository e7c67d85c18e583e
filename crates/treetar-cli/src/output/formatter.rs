//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use treetar_core::ArchiveArtifact;
use treetar_core::ManifestEntry;
use treetar_core::VerifyOutcome;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format a finished archive
    fn format_archive_result(&self, artifact: &ArchiveArtifact) -> Result<()>;

    /// Format an archive listing
    fn format_manifest(&self, archive: &Path, entries: &[ManifestEntry], long: bool)
    -> Result<()>;

    /// Format a checksum comparison
    fn format_verify_result(&self, archive: &Path, outcome: &VerifyOutcome) -> Result<()>;

    /// Format error message
    fn format_error(&self, operation: &str, error: &anyhow::Error);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
