//! I/O adapters used by the archive pipeline.
//!
//! The archive is produced in a single pass: every byte the tar writer emits
//! goes through a [`HashingWriter`] on its way to the output medium.

pub mod hashing;

pub use hashing::Checksum;
pub use hashing::HashingWriter;
