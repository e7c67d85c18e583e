//! Streaming tar archiver with built-in content addressing.
//!
//! `treetar-core` packages a directory tree, a single file or every match of a
//! glob pattern into a standard tar stream. Each entry is renamed under a
//! caller-supplied prefix, and a SHA-256 of the full stream is computed while
//! it is written, so the artifact can be verified or deduplicated without a
//! second read.
//!
//! Symlinks are archived as links and never followed. Pipes, sockets and
//! device nodes are skipped silently. The directory at the top of a walked
//! subtree gets no entry of its own.
//!
//! # Examples
//!
//! ```no_run
//! use treetar_core::archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let artifact = archive("/srv/app", "/")?;
//! println!(
//!     "{} ({} entries) sha256:{}",
//!     artifact.path.display(),
//!     artifact.report.total_entries(),
//!     artifact.checksum
//! );
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archiver;
pub mod classify;
pub mod config;
pub mod error;
pub mod header;
pub mod inspection;
pub mod io;
pub mod report;
pub mod resolve;
pub mod walker;
pub mod writer;

// Re-export main API types
pub use api::ArchiveArtifact;
pub use api::archive;
pub use api::archive_to_writer;
pub use api::archive_with_config;
pub use archiver::Archiver;
pub use config::ArchiveConfig;
pub use config::HeaderMode;
pub use error::ArchiveError;
pub use error::Result;
pub use inspection::ManifestEntry;
pub use inspection::ManifestEntryKind;
pub use inspection::VerifyOutcome;
pub use inspection::checksum_file;
pub use inspection::list_artifact;
pub use inspection::verify_artifact;
pub use io::Checksum;
pub use report::ArchiveReport;
