//! Tar stream serialization.
//!
//! Layout per entry: optional GNU long-name / long-link extension records, a
//! 512-byte header block, then (regular files only) the content padded to a
//! 512-byte boundary. The stream ends with two zero blocks. Content is copied
//! from the source reader in bounded chunks; no entry is ever held in memory.
//!
//! The end marker is written only by [`StreamWriter::finish`]. A writer
//! dropped before that, for example after a failed entry, leaves the stream
//! without it, so a truncated stream never reads as a complete archive.

use crate::ArchiveError;
use crate::Result;
use crate::classify::EntryKind;
use crate::header::EntryHeader;
use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use tar::Builder;
use tar::Header;

/// Name GNU tar gives to long-name and long-link extension records.
const GNU_LONG_LINK_NAME: &[u8] = b"././@LongLink";

/// Writes [`EntryHeader`]s and their content as a tar byte stream.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use treetar_core::ArchiveConfig;
/// use treetar_core::classify::EntryKind;
/// use treetar_core::header::{ArchiveName, EntryHeader};
/// use treetar_core::writer::StreamWriter;
///
/// let header = EntryHeader {
///     name: ArchiveName::new("/", Path::new("hello.txt"))?,
///     kind: EntryKind::Regular,
///     mode: 0o644,
///     uid: 0,
///     gid: 0,
///     mtime: 0,
///     size: 5,
///     link_target: None,
/// };
///
/// let mut writer = StreamWriter::new(Vec::new());
/// writer.append_entry(&header, &b"hello"[..])?;
/// let bytes = writer.finish()?;
///
/// // header + one content block + two end-of-archive blocks
/// assert_eq!(bytes.len(), 4 * 512);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct StreamWriter<W: Write> {
    builder: Option<Builder<Gate<W>>>,
}

impl<W: Write> StreamWriter<W> {
    /// Creates a writer emitting into `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            builder: Some(Builder::new(Gate {
                inner,
                sealed: false,
            })),
        }
    }

    fn builder(&mut self) -> io::Result<&mut Builder<Gate<W>>> {
        self.builder
            .as_mut()
            .ok_or_else(|| io::Error::other("tar stream already finished"))
    }

    /// Appends one entry whose content is read from `content`.
    ///
    /// Exactly `header.size` bytes are written: a short reader is padded with
    /// zeros and a long one is cut off, so a file changing size between stat
    /// and read cannot desynchronize the stream.
    pub fn append_entry<R: Read>(&mut self, header: &EntryHeader, content: R) -> io::Result<()> {
        if header.needs_long_name() {
            self.append_extension(tar::EntryType::GNULongName, header.name.as_bytes())?;
        }
        if let Some(target) = header.link_target.as_deref()
            && header.needs_long_link()
        {
            self.append_extension(tar::EntryType::GNULongLink, target)?;
        }

        let size = header.size;
        let content = content.take(size).chain(io::repeat(0)).take(size);
        self.builder()?.append(&header.to_tar_header(), content)
    }

    /// Appends one entry, streaming content from `source` for regular files.
    ///
    /// # Errors
    ///
    /// Opening `source` maps to [`ArchiveError::AccessDenied`] or
    /// [`ArchiveError::NotFound`] by kind; write failures are
    /// [`ArchiveError::Io`].
    pub fn append_from_path(&mut self, header: &EntryHeader, source: &Path) -> Result<()> {
        if header.kind == EntryKind::Regular {
            let file = File::open(source).map_err(|e| ArchiveError::from_io(e, source))?;
            self.append_entry(header, file)?;
        } else {
            self.append_entry(header, io::empty())?;
        }
        Ok(())
    }

    /// Writes the end-of-archive marker and returns the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        let builder = self
            .builder
            .take()
            .ok_or_else(|| io::Error::other("tar stream already finished"))?;
        builder.into_inner().map(|gate| gate.inner)
    }

    fn append_extension(&mut self, entry_type: tar::EntryType, value: &[u8]) -> io::Result<()> {
        let mut header = Header::new_gnu();
        header.as_old_mut().name[..GNU_LONG_LINK_NAME.len()].copy_from_slice(GNU_LONG_LINK_NAME);
        header.set_mode(0o644);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mtime(0);
        // +1 for the trailing NUL, as GNU tar writes it
        header.set_size(value.len() as u64 + 1);
        header.set_entry_type(entry_type);
        header.set_cksum();

        self.builder()?.append(&header, value.chain(&b"\0"[..]))
    }
}

impl<W: Write> Drop for StreamWriter<W> {
    fn drop(&mut self) {
        // tar::Builder writes the end marker when dropped unfinished.
        if let Some(builder) = self.builder.as_mut() {
            builder.get_mut().sealed = true;
        }
    }
}

/// Passes writes through until sealed, then rejects them.
struct Gate<W> {
    inner: W,
    sealed: bool,
}

impl<W: Write> Write for Gate<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.sealed {
            return Err(io::Error::other("tar stream abandoned"));
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.sealed {
            return Ok(());
        }
        self.inner.flush()
    }
}
