//! Archive naming and canonical header construction.

use crate::ArchiveError;
use crate::Result;
use crate::classify::EntryKind;
use crate::config::ArchiveConfig;
use crate::config::HeaderMode;
use crate::walker::FileKind;
use crate::walker::FilesystemEntry;
use std::borrow::Cow;
use std::path::Component;
use std::path::Path;
use tar::Header;

/// Width of the name and link-name fields in a tar header block.
pub const NAME_FIELD_LEN: usize = 100;

/// Permission, setuid, setgid and sticky bits; file-type bits are dropped.
pub const MODE_MASK: u32 = 0o7777;

/// A forward-slash separated entry name: destination prefix plus the path
/// relative to where traversal began.
///
/// Names are raw bytes so non-UTF-8 file names survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveName(Vec<u8>);

impl ArchiveName {
    /// Joins `prefix` and `relative` with exactly one `/` between them.
    ///
    /// # Errors
    ///
    /// Returns an error if `relative` contains anything other than plain
    /// components, or (off Unix) a component that is not valid Unicode.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use treetar_core::header::ArchiveName;
    ///
    /// let name = ArchiveName::new("/", Path::new("etc/hosts"))?;
    /// assert_eq!(name.as_bytes(), b"/etc/hosts");
    ///
    /// let name = ArchiveName::new("/opt/app", Path::new("bin"))?;
    /// assert_eq!(name.as_bytes(), b"/opt/app/bin");
    /// # Ok::<(), treetar_core::ArchiveError>(())
    /// ```
    pub fn new(prefix: &str, relative: &Path) -> Result<Self> {
        let mut name = normalize_separators(prefix).into_owned().into_bytes();

        for component in relative.components() {
            let Component::Normal(part) = component else {
                return Err(ArchiveError::Io(std::io::Error::other(format!(
                    "unexpected component in relative path {}",
                    relative.display()
                ))));
            };
            if !name.is_empty() && !name.ends_with(b"/") {
                name.push(b'/');
            }
            name.extend_from_slice(&path_bytes(Path::new(part))?);
        }

        Ok(Self(name))
    }

    /// Returns the raw name bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the name as text, replacing invalid UTF-8.
    #[must_use]
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl std::fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Format-independent description of one archive record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    /// Entry name inside the archive.
    pub name: ArchiveName,
    /// Record kind.
    pub kind: EntryKind,
    /// Mode bits (masked with [`MODE_MASK`]).
    pub mode: u32,
    /// Owning user id.
    pub uid: u64,
    /// Owning group id.
    pub gid: u64,
    /// Modification time, seconds since the epoch.
    pub mtime: u64,
    /// Content length; 0 unless `kind` is [`EntryKind::Regular`].
    pub size: u64,
    /// Raw symlink target; `Some` only for [`EntryKind::Symlink`].
    pub link_target: Option<Vec<u8>>,
}

impl EntryHeader {
    /// Builds the header for a classified traversal entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry name or link target cannot be encoded.
    pub fn build(entry: &FilesystemEntry, kind: EntryKind, config: &ArchiveConfig) -> Result<Self> {
        let name = ArchiveName::new(&config.prefix, &entry.relative_path)?;

        let link_target = match &entry.kind {
            FileKind::Symlink { target } => Some(path_bytes(target)?),
            _ => None,
        };

        let (uid, gid, mtime) = match config.header_mode {
            HeaderMode::Complete => (
                entry.ownership.uid,
                entry.ownership.gid,
                entry.ownership.mtime,
            ),
            HeaderMode::Deterministic => (0, 0, 0),
        };

        Ok(Self {
            name,
            kind,
            mode: entry.ownership.mode & MODE_MASK,
            uid,
            gid,
            mtime,
            size: if kind == EntryKind::Regular {
                entry.size
            } else {
                0
            },
            link_target,
        })
    }

    /// Returns `true` if the name needs a long-name extension record.
    #[must_use]
    pub fn needs_long_name(&self) -> bool {
        self.name.as_bytes().len() > NAME_FIELD_LEN
    }

    /// Returns `true` if the link target needs a long-link extension record.
    #[must_use]
    pub fn needs_long_link(&self) -> bool {
        self.link_target
            .as_ref()
            .is_some_and(|target| target.len() > NAME_FIELD_LEN)
    }

    /// Renders a GNU tar header block with a valid checksum.
    ///
    /// Names and targets longer than [`NAME_FIELD_LEN`] are truncated here;
    /// the stream writer precedes such headers with extension records holding
    /// the full value.
    #[must_use]
    pub fn to_tar_header(&self) -> Header {
        let mut header = Header::new_gnu();
        header.set_entry_type(match self.kind {
            EntryKind::Regular => tar::EntryType::Regular,
            EntryKind::Directory => tar::EntryType::Directory,
            EntryKind::Symlink => tar::EntryType::Symlink,
        });
        header.set_mode(self.mode);
        header.set_uid(self.uid);
        header.set_gid(self.gid);
        header.set_mtime(self.mtime);
        header.set_size(self.size);

        // Absolute names are written straight into the fields; `set_path`
        // refuses them.
        copy_field(&mut header.as_old_mut().name, self.name.as_bytes());
        if let Some(target) = &self.link_target {
            copy_field(&mut header.as_old_mut().linkname, target);
        }

        header.set_cksum();
        header
    }
}

fn copy_field(field: &mut [u8], value: &[u8]) {
    let len = value.len().min(field.len());
    field[..len].copy_from_slice(&value[..len]);
}

#[cfg(windows)]
fn normalize_separators(prefix: &str) -> Cow<'_, str> {
    Cow::Owned(prefix.replace('\\', "/"))
}

#[cfg(not(windows))]
fn normalize_separators(prefix: &str) -> Cow<'_, str> {
    Cow::Borrowed(prefix)
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Result<Vec<u8>> {
    use std::os::unix::ffi::OsStrExt;
    Ok(path.as_os_str().as_bytes().to_vec())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Result<Vec<u8>> {
    let text = path.to_str().ok_or_else(|| {
        ArchiveError::Io(std::io::Error::other(format!(
            "path is not valid Unicode: {}",
            path.display()
        )))
    })?;
    Ok(text.replace('\\', "/").into_bytes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::walker::Ownership;
    use std::path::PathBuf;

    fn entry(kind: FileKind, relative: &str, size: u64) -> FilesystemEntry {
        FilesystemEntry {
            path: PathBuf::from("/src").join(relative),
            relative_path: PathBuf::from(relative),
            depth: 1,
            kind,
            size,
            ownership: Ownership {
                mode: 0o100_644,
                uid: 1000,
                gid: 100,
                mtime: 1_700_000_000,
            },
        }
    }

    #[test]
    fn test_name_with_root_prefix() {
        let name = ArchiveName::new("/", Path::new("a/b/c.txt")).unwrap();
        assert_eq!(name.as_bytes(), b"/a/b/c.txt");
    }

    #[test]
    fn test_name_with_prefix_lacking_trailing_slash() {
        let name = ArchiveName::new("layer", Path::new("file")).unwrap();
        assert_eq!(name.as_bytes(), b"layer/file");
    }

    #[test]
    fn test_name_with_empty_prefix() {
        let name = ArchiveName::new("", Path::new("dir/file")).unwrap();
        assert_eq!(name.as_bytes(), b"dir/file");
    }

    #[test]
    fn test_name_for_empty_relative_is_prefix() {
        let name = ArchiveName::new("/base/", Path::new("")).unwrap();
        assert_eq!(name.as_bytes(), b"/base/");
    }

    #[test]
    fn test_name_rejects_parent_components() {
        assert!(ArchiveName::new("/", Path::new("../escape")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_name_preserves_non_utf8_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let relative = Path::new(OsStr::from_bytes(b"caf\xe9"));
        let name = ArchiveName::new("/", relative).unwrap();
        assert_eq!(name.as_bytes(), b"/caf\xe9");
        assert!(name.to_string().contains('\u{fffd}'));
    }

    #[test]
    fn test_build_regular_header() {
        let config = ArchiveConfig::default();
        let header =
            EntryHeader::build(&entry(FileKind::Regular, "f.txt", 42), EntryKind::Regular, &config)
                .unwrap();

        assert_eq!(header.name.as_bytes(), b"/f.txt");
        assert_eq!(header.mode, 0o644);
        assert_eq!(header.size, 42);
        assert_eq!(header.uid, 1000);
        assert_eq!(header.gid, 100);
        assert_eq!(header.mtime, 1_700_000_000);
        assert!(header.link_target.is_none());
    }

    #[test]
    fn test_build_directory_header_has_zero_size() {
        let config = ArchiveConfig::default();
        let header = EntryHeader::build(
            &entry(FileKind::Directory, "d", 4096),
            EntryKind::Directory,
            &config,
        )
        .unwrap();
        assert_eq!(header.size, 0);
    }

    #[test]
    fn test_build_symlink_header_keeps_raw_target() {
        let config = ArchiveConfig::default();
        let kind = FileKind::Symlink {
            target: PathBuf::from("../../lib/libc.so"),
        };
        let header = EntryHeader::build(&entry(kind, "lib/link", 0), EntryKind::Symlink, &config)
            .unwrap();
        assert_eq!(
            header.link_target.as_deref(),
            Some(&b"../../lib/libc.so"[..])
        );
    }

    #[test]
    fn test_deterministic_mode_zeroes_ownership_and_time() {
        let config = ArchiveConfig::default().with_header_mode(HeaderMode::Deterministic);
        let header =
            EntryHeader::build(&entry(FileKind::Regular, "f", 1), EntryKind::Regular, &config)
                .unwrap();
        assert_eq!((header.uid, header.gid, header.mtime), (0, 0, 0));
        assert_eq!(header.mode, 0o644);
    }

    #[test]
    fn test_tar_header_fields() {
        let config = ArchiveConfig::default();
        let header =
            EntryHeader::build(&entry(FileKind::Regular, "f.txt", 42), EntryKind::Regular, &config)
                .unwrap()
                .to_tar_header();

        assert_eq!(header.entry_type(), tar::EntryType::Regular);
        assert_eq!(&header.path_bytes()[..], b"/f.txt");
        assert_eq!(header.mode().unwrap(), 0o644);
        assert_eq!(header.size().unwrap(), 42);
        assert_eq!(header.uid().unwrap(), 1000);
        assert_eq!(header.mtime().unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_tar_header_checksum_is_valid() {
        let config = ArchiveConfig::default();
        let header =
            EntryHeader::build(&entry(FileKind::Regular, "f", 0), EntryKind::Regular, &config)
                .unwrap()
                .to_tar_header();

        let mut recomputed = header.clone();
        recomputed.set_cksum();
        assert_eq!(header.cksum().unwrap(), recomputed.cksum().unwrap());
    }

    #[test]
    fn test_long_name_detection() {
        let config = ArchiveConfig::default();
        let long = "d/".repeat(60) + "file";
        let header =
            EntryHeader::build(&entry(FileKind::Regular, &long, 0), EntryKind::Regular, &config)
                .unwrap();
        assert!(header.needs_long_name());
        assert!(!header.needs_long_link());
        assert_eq!(header.to_tar_header().path_bytes().len(), NAME_FIELD_LEN);
    }
}
