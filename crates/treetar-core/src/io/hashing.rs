//! Duplicating writer that digests and counts everything it forwards.
//!
//! This module provides a `HashingWriter` that wraps any `Write`
//! implementation, feeds every successfully written byte into a SHA-256
//! state and tracks the total byte count.

use sha2::Digest;
use sha2::Sha256;
use std::fmt::Write as _;
use std::io::Write;

/// Wrapper writer that hashes and counts the bytes it passes through.
///
/// Only bytes the inner writer accepted are hashed, so after a partial write
/// the digest still describes exactly what reached the sink.
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use treetar_core::io::HashingWriter;
///
/// let mut writer = HashingWriter::new(Vec::new());
/// writer.write_all(b"abc")?;
///
/// let (buffer, checksum, total) = writer.finish();
/// assert_eq!(buffer, b"abc");
/// assert_eq!(total, 3);
/// assert_eq!(
///     checksum.to_string(),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
    bytes_written: u64,
}

impl<W> HashingWriter<W> {
    /// Creates a new hashing writer around `inner`.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes_written: 0,
        }
    }

    /// Returns the number of bytes forwarded so far.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    /// Returns a reference to the inner writer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consumes the writer, finalizing the digest exactly once.
    ///
    /// Returns the inner writer, the checksum and the total byte count. The
    /// inner writer is not flushed; callers owning a buffered sink flush it
    /// before handing the result on.
    #[must_use]
    pub fn finish(self) -> (W, Checksum, u64) {
        let digest: [u8; 32] = self.hasher.finalize().into();
        (self.inner, Checksum(digest), self.bytes_written)
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.hasher.update(&buf[..bytes]);
        self.bytes_written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// A finalized SHA-256 digest of an archive byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum([u8; 32]);

impl Checksum {
    /// Computes the checksum of an in-memory byte slice.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Renders the digest as lowercase hexadecimal.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(64);
        for byte in self.0 {
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }

    /// Parses a 64-digit hexadecimal string (either case).
    ///
    /// Returns `None` if the string is not exactly 32 hex-encoded bytes.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let mut digest = [0u8; 32];
        for (i, byte) in digest.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(digest))
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
