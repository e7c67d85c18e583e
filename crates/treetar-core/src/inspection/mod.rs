//! Inspection of finished archive artifacts.
//!
//! Neither operation extracts anything: listing reads headers only and
//! verification re-digests the file in a single streamed pass.
//!
//! # Examples
//!
//! ```no_run
//! use treetar_core::list_artifact;
//! use treetar_core::verify_artifact;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = verify_artifact("/tmp/treetar-abc.tar", "e3b0c442...")?;
//! if outcome.matches {
//!     for entry in list_artifact("/tmp/treetar-abc.tar")? {
//!         println!("{} {}", entry.kind, entry.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod list;
pub mod verify;

pub use list::ManifestEntry;
pub use list::ManifestEntryKind;
pub use list::list_artifact;
pub use verify::VerifyOutcome;
pub use verify::checksum_file;
pub use verify::verify_artifact;
