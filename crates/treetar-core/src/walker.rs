//! Depth-first traversal of a resolved root.
//!
//! Symlinks are never followed, not even when the root itself is one: a
//! symlink is always reported as a leaf carrying its raw target.

use crate::ArchiveError;
use crate::Result;
use crate::config::ArchiveConfig;
use std::fs::Metadata;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Lazily walks one root, yielding the root and every descendant.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use treetar_core::ArchiveConfig;
/// use treetar_core::walker::TreeWalker;
///
/// let config = ArchiveConfig::default();
/// let walker = TreeWalker::new(Path::new("/srv/app"), &config);
///
/// for entry in walker.walk() {
///     let entry = entry?;
///     println!("{:?} {}", entry.kind, entry.relative_path.display());
/// }
/// # Ok::<(), treetar_core::ArchiveError>(())
/// ```
pub struct TreeWalker<'a> {
    root: &'a Path,
    config: &'a ArchiveConfig,
}

impl<'a> TreeWalker<'a> {
    /// Creates a walker for the given resolved root.
    #[must_use]
    pub fn new(root: &'a Path, config: &'a ArchiveConfig) -> Self {
        Self { root, config }
    }

    /// Returns an iterator over the entries under the root, depth-first.
    ///
    /// Siblings are sorted by file name when `sort_entries` is set. The first
    /// error ends the traversal from the caller's point of view: archiving
    /// never continues past an unreadable entry.
    ///
    /// # Errors
    ///
    /// Items are [`ArchiveError::AccessDenied`] when a directory or entry
    /// cannot be read, [`ArchiveError::NotFound`] when it vanished mid-walk.
    pub fn walk(&self) -> impl Iterator<Item = Result<FilesystemEntry>> + '_ {
        let mut walker = WalkDir::new(self.root)
            .follow_links(false)
            .follow_root_links(false);
        if self.config.sort_entries {
            walker = walker.sort_by_file_name();
        }

        walker.into_iter().map(move |entry| {
            let entry = entry.map_err(|e| ArchiveError::from_walk(e, self.root))?;
            self.build_entry(&entry)
        })
    }

    fn build_entry(&self, entry: &walkdir::DirEntry) -> Result<FilesystemEntry> {
        let path = entry.path();
        let metadata = entry
            .metadata()
            .map_err(|e| ArchiveError::from_walk(e, path))?;

        let kind = if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(path).map_err(|e| ArchiveError::from_io(e, path))?;
            FileKind::Symlink { target }
        } else if metadata.is_dir() {
            FileKind::Directory
        } else if metadata.is_file() {
            FileKind::Regular
        } else {
            FileKind::Special(SpecialKind::from_metadata(&metadata))
        };

        let relative_path = if entry.depth() == 0 {
            // A directory root contributes no name of its own; any other root
            // is named after itself.
            match (&kind, path.file_name()) {
                (FileKind::Directory, _) | (_, None) => PathBuf::new(),
                (_, Some(name)) => PathBuf::from(name),
            }
        } else {
            path.strip_prefix(self.root)
                .map_err(|_| {
                    ArchiveError::Io(std::io::Error::other(format!(
                        "{} is not under {}",
                        path.display(),
                        self.root.display()
                    )))
                })?
                .to_path_buf()
        };

        let size = if kind == FileKind::Regular {
            metadata.len()
        } else {
            0
        };

        Ok(FilesystemEntry {
            path: path.to_path_buf(),
            relative_path,
            depth: entry.depth(),
            kind,
            size,
            ownership: Ownership::from_metadata(&metadata),
        })
    }
}

/// One traversal node with the metadata the archive needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemEntry {
    /// Absolute filesystem path.
    pub path: PathBuf,

    /// Path relative to the point traversal began; empty for a directory root.
    pub relative_path: PathBuf,

    /// Distance from the root (the root itself is 0).
    pub depth: usize,

    /// What kind of filesystem object this is.
    pub kind: FileKind,

    /// Size in bytes for regular files, 0 otherwise.
    pub size: u64,

    /// Mode bits, owner and modification time.
    pub ownership: Ownership,
}

impl FilesystemEntry {
    /// Returns `true` for the top of a walked subtree.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// Raw filesystem object type as reported by a non-following stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// Regular file.
    Regular,

    /// Directory.
    Directory,

    /// Symbolic link with its unresolved target.
    Symlink {
        /// Link target exactly as stored on disk.
        target: PathBuf,
    },

    /// Pipe, socket, device node or anything else.
    Special(SpecialKind),
}

/// Flavours of special file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKind {
    /// Named pipe.
    Fifo,
    /// Unix domain socket.
    Socket,
    /// Character device.
    CharDevice,
    /// Block device.
    BlockDevice,
    /// Anything the platform reports that fits no other category.
    Unknown,
}

impl SpecialKind {
    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata) -> Self {
        use std::os::unix::fs::FileTypeExt;
        let file_type = metadata.file_type();
        if file_type.is_fifo() {
            Self::Fifo
        } else if file_type.is_socket() {
            Self::Socket
        } else if file_type.is_char_device() {
            Self::CharDevice
        } else if file_type.is_block_device() {
            Self::BlockDevice
        } else {
            Self::Unknown
        }
    }

    #[cfg(not(unix))]
    fn from_metadata(_metadata: &Metadata) -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for SpecialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fifo => "fifo",
            Self::Socket => "socket",
            Self::CharDevice => "character device",
            Self::BlockDevice => "block device",
            Self::Unknown => "special file",
        };
        f.write_str(name)
    }
}

/// Permission bits, ownership and timestamp copied from the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ownership {
    /// Full `st_mode` as reported by the filesystem.
    pub mode: u32,
    /// Owning user id.
    pub uid: u64,
    /// Owning group id.
    pub gid: u64,
    /// Modification time in seconds since the epoch, clamped to 0.
    pub mtime: u64,
}

impl Ownership {
    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        // mtime can be negative for dates before epoch, clamp to 0
        #[allow(clippy::cast_sign_loss)]
        let mtime = metadata.mtime().max(0) as u64;
        Self {
            mode: metadata.mode(),
            uid: u64::from(metadata.uid()),
            gid: u64::from(metadata.gid()),
            mtime,
        }
    }

    #[cfg(not(unix))]
    fn from_metadata(metadata: &Metadata) -> Self {
        let mode = if metadata.is_dir() {
            0o755
        } else if metadata.permissions().readonly() {
            0o444
        } else {
            0o644
        };
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());
        Self {
            mode,
            uid: 0,
            gid: 0,
            mtime,
        }
    }
}
