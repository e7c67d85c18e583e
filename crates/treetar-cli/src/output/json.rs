//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use treetar_core::ArchiveArtifact;
use treetar_core::ManifestEntry;
use treetar_core::VerifyOutcome;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ArchiveOutput {
    path: String,
    checksum: String,
    roots: usize,
    files_added: usize,
    directories_added: usize,
    symlinks_added: usize,
    special_files_skipped: usize,
    content_bytes: u64,
    archive_bytes: u64,
    duration_ms: u128,
}

impl From<&ArchiveArtifact> for ArchiveOutput {
    fn from(artifact: &ArchiveArtifact) -> Self {
        let report = &artifact.report;
        Self {
            path: artifact.path.display().to_string(),
            checksum: artifact.checksum.to_hex(),
            roots: report.roots,
            files_added: report.files_added,
            directories_added: report.directories_added,
            symlinks_added: report.symlinks_added,
            special_files_skipped: report.special_files_skipped,
            content_bytes: report.content_bytes,
            archive_bytes: report.archive_bytes,
            duration_ms: report.duration.as_millis(),
        }
    }
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    name: &'a str,
    kind: String,
    mode: u32,
    uid: u64,
    gid: u64,
    mtime: u64,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_target: Option<&'a str>,
}

impl<'a> From<&'a ManifestEntry> for EntryOutput<'a> {
    fn from(entry: &'a ManifestEntry) -> Self {
        Self {
            name: &entry.name,
            kind: entry.kind.to_string(),
            mode: entry.mode,
            uid: entry.uid,
            gid: entry.gid,
            mtime: entry.mtime,
            size: entry.size,
            link_target: entry.link_target.as_deref(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_archive_result(&self, artifact: &ArchiveArtifact) -> Result<()> {
        Self::output(&JsonOutput::success(
            "archive",
            ArchiveOutput::from(artifact),
        ))
    }

    fn format_manifest(&self, archive: &Path, entries: &[ManifestEntry], _long: bool) -> Result<()> {
        #[derive(Serialize)]
        struct ManifestOutput<'a> {
            archive: String,
            total_entries: usize,
            entries: Vec<EntryOutput<'a>>,
        }

        let data = ManifestOutput {
            archive: archive.display().to_string(),
            total_entries: entries.len(),
            entries: entries.iter().map(EntryOutput::from).collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_verify_result(&self, archive: &Path, outcome: &VerifyOutcome) -> Result<()> {
        #[derive(Serialize)]
        struct VerifyOutput {
            archive: String,
            expected: String,
            actual: String,
            matches: bool,
        }

        let data = VerifyOutput {
            archive: archive.display().to_string(),
            expected: outcome.expected.clone(),
            actual: outcome.actual.to_hex(),
            matches: outcome.matches,
        };

        Self::output(&JsonOutput::success("verify", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }
}
