//! Integration tests for treetar-core.
//!
//! Every artifact is read back with the `tar` crate's reader, so these tests
//! double as a compatibility check against a standard archive reader.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::fs;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;
use tempfile::TempDir;
use treetar_core::ArchiveConfig;
use treetar_core::ArchiveError;
use treetar_core::Archiver;
use treetar_core::Checksum;
use treetar_core::HeaderMode;
use treetar_core::ManifestEntryKind;
use treetar_core::archive;
use treetar_core::archive_to_writer;
use treetar_core::archive_with_config;
use treetar_core::checksum_file;
use treetar_core::list_artifact;
use treetar_core::verify_artifact;

struct ReadBack {
    name: String,
    kind: tar::EntryType,
    data: Vec<u8>,
    link: Option<String>,
}

fn read_back(bytes: &[u8]) -> Vec<ReadBack> {
    let mut archive = tar::Archive::new(bytes);
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = String::from_utf8(entry.path_bytes().into_owned()).unwrap();
            let kind = entry.header().entry_type();
            let link = entry
                .link_name_bytes()
                .map(|b| String::from_utf8(b.into_owned()).unwrap());
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            ReadBack {
                name,
                kind,
                data,
                link,
            }
        })
        .collect()
}

fn to_bytes(source: &str, config: &ArchiveConfig) -> Vec<u8> {
    archive_to_writer(source, config, Vec::new()).unwrap().0
}

fn names(bytes: &[u8]) -> Vec<String> {
    read_back(bytes).into_iter().map(|e| e.name).collect()
}

fn src(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Builds `root/{a.txt, sub/, sub/b.txt, sub/deeper/, sub/deeper/c.txt}`.
fn sample_tree(root: &Path) {
    fs::create_dir_all(root.join("sub/deeper")).unwrap();
    fs::write(root.join("a.txt"), "alpha").unwrap();
    fs::write(root.join("sub/b.txt"), "beta").unwrap();
    fs::write(root.join("sub/deeper/c.txt"), "gamma").unwrap();
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn mkfifo(path: &Path) {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).unwrap();
    // SAFETY: c_path is a valid NUL-terminated string for the call's duration.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) };
    assert_eq!(rc, 0, "mkfifo failed");
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn running_as_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// Accepts `budget` bytes, then fails every write.
#[derive(Debug)]
struct FailingSink {
    budget: usize,
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::other("device full"));
        }
        let n = buf.len().min(self.budget);
        self.budget -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Builds a tree whose deepest entries exceed `PATH_MAX`, so traversal fails
/// partway through regardless of the caller's privileges.
///
/// Directories are nested from the inside out with renames, keeping every
/// path handed to the kernel short.
#[cfg(target_os = "linux")]
fn path_max_tree(root: &Path) -> std::path::PathBuf {
    let long = "d".repeat(200);
    let cur = root.join("cur");
    fs::create_dir(&cur).unwrap();
    fs::write(cur.join("leaf.txt"), "leaf").unwrap();

    for _ in 0..24 {
        let next = root.join("next");
        fs::create_dir_all(next.join(&long)).unwrap();
        fs::rename(&cur, next.join(&long).join("cur")).unwrap();
        fs::rename(&next, &cur).unwrap();
    }
    fs::write(cur.join("top.txt"), "top").unwrap();
    cur
}

#[test]
fn test_entries_named_prefix_plus_relative_path() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());

    let bytes = to_bytes(src(temp.path()), &ArchiveConfig::default());

    assert_eq!(
        names(&bytes),
        vec![
            "/a.txt",
            "/sub",
            "/sub/b.txt",
            "/sub/deeper",
            "/sub/deeper/c.txt",
        ]
    );
}

#[test]
fn test_every_name_has_prefix_as_strict_prefix() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());

    for prefix in ["/", "/layer", "/opt/app/", "rel"] {
        let config = ArchiveConfig::default().with_prefix(prefix);
        for name in names(&to_bytes(src(temp.path()), &config)) {
            assert!(name.starts_with(prefix), "{name} lacks prefix {prefix}");
            assert!(name.len() > prefix.len());
            assert!(!name.contains("//"), "{name} has a doubled separator");
        }
    }
}

#[test]
fn test_content_round_trips() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());

    let entries = read_back(&to_bytes(src(temp.path()), &ArchiveConfig::default()));
    let find = |name: &str| entries.iter().find(|e| e.name == name).unwrap();

    assert_eq!(find("/a.txt").data, b"alpha");
    assert_eq!(find("/sub/b.txt").data, b"beta");
    assert_eq!(find("/sub/deeper/c.txt").data, b"gamma");
    assert_eq!(find("/sub").kind, tar::EntryType::Directory);
    assert!(find("/sub").data.is_empty());
}

#[test]
fn test_single_file_root_is_named_by_basename() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());

    let config = ArchiveConfig::default().with_prefix("/etc");
    let entries = read_back(&to_bytes(src(&temp.path().join("sub/b.txt")), &config));

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "/etc/b.txt");
    assert_eq!(entries[0].data, b"beta");
}

#[cfg(unix)]
#[test]
fn test_symlink_target_is_stored_raw() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("real"), "x").unwrap();
    symlink("real", temp.path().join("relative")).unwrap();
    symlink("../../outside/nowhere", temp.path().join("dangling")).unwrap();

    let entries = read_back(&to_bytes(src(temp.path()), &ArchiveConfig::default()));
    let find = |name: &str| entries.iter().find(|e| e.name == name).unwrap();

    assert_eq!(find("/relative").kind, tar::EntryType::Symlink);
    assert_eq!(find("/relative").link.as_deref(), Some("real"));
    assert_eq!(
        find("/dangling").link.as_deref(),
        Some("../../outside/nowhere")
    );
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_is_not_descended() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("secret"), "s").unwrap();
    symlink(outside.path(), temp.path().join("link")).unwrap();

    let entries = read_back(&to_bytes(src(temp.path()), &ArchiveConfig::default()));

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, tar::EntryType::Symlink);
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_as_literal_root() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let link = temp.path().join("broken");
    symlink("missing-target", &link).unwrap();

    let entries = read_back(&to_bytes(src(&link), &ArchiveConfig::default()));

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "/broken");
    assert_eq!(entries[0].link.as_deref(), Some("missing-target"));
}

#[cfg(unix)]
#[test]
fn test_special_files_are_skipped() {
    use std::os::unix::fs::symlink;
    use std::os::unix::net::UnixListener;

    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("test"), "data").unwrap();
    symlink(temp.path().join("test"), temp.path().join("link")).unwrap();
    mkfifo(&temp.path().join("pipe"));
    let _listener = UnixListener::bind(temp.path().join("sock")).unwrap();

    let (bytes, _, report) =
        archive_to_writer(src(temp.path()), &ArchiveConfig::default(), Vec::new()).unwrap();
    let entries = read_back(&bytes);

    assert_eq!(entries.len(), 2);
    assert_eq!(report.special_files_skipped, 2);
    let link = entries.iter().find(|e| e.name == "/link").unwrap();
    assert!(link.link.as_deref().unwrap().ends_with("test"));
}

#[cfg(unix)]
#[test]
fn test_entry_count_independent_of_special_files() {
    let plain = TempDir::new().unwrap();
    let noisy = TempDir::new().unwrap();
    for dir in [plain.path(), noisy.path()] {
        sample_tree(dir);
    }
    for i in 0..5 {
        mkfifo(&noisy.path().join(format!("fifo{i}")));
        mkfifo(&noisy.path().join(format!("sub/fifo{i}")));
    }

    let config = ArchiveConfig::default();
    let plain_entries = read_back(&to_bytes(src(plain.path()), &config));
    let noisy_entries = read_back(&to_bytes(src(noisy.path()), &config));

    assert_eq!(plain_entries.len(), 5);
    assert_eq!(noisy_entries.len(), plain_entries.len());
}

#[test]
fn test_glob_entries_share_common_prefix() {
    let temp = TempDir::new().unwrap();
    for i in 0..20 {
        fs::write(temp.path().join(format!("foo{i}")), "f").unwrap();
        fs::write(temp.path().join(format!("bar{i}")), "b").unwrap();
    }

    let pattern = format!("{}/foo*", temp.path().display());
    let (bytes, _, report) =
        archive_to_writer(&pattern, &ArchiveConfig::default(), Vec::new()).unwrap();
    let names = names(&bytes);

    assert_eq!(report.roots, 20);
    assert_eq!(names.len(), 20);
    for name in &names {
        let base = name.rsplit('/').next().unwrap();
        assert!(base.starts_with("foo"), "unexpected entry {name}");
        assert!(name.starts_with('/'));
    }
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn test_glob_directory_matches_are_walked() {
    let temp = TempDir::new().unwrap();
    for i in 0..3 {
        let dir = temp.path().join(format!("pkg{i}"));
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("manifest"), format!("{i}")).unwrap();
    }

    let pattern = format!("{}/pkg*", temp.path().display());
    let names = names(&to_bytes(&pattern, &ArchiveConfig::default()));

    // Each directory root contributes its contents only.
    assert_eq!(names, vec!["/manifest", "/manifest", "/manifest"]);
}

#[test]
fn test_empty_glob_yields_end_marker_only() {
    let temp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let pattern = format!("{}/nothing-*", temp.path().display());

    let artifact = archive_with_config(
        &pattern,
        &ArchiveConfig::default().with_temp_dir(Some(out.path().to_path_buf())),
    )
    .unwrap();

    let bytes = fs::read(&artifact.path).unwrap();
    assert_eq!(bytes, vec![0u8; 1024]);
    assert_eq!(artifact.checksum, Checksum::of(&[0u8; 1024]));
    assert_eq!(artifact.report.roots, 0);
    assert_eq!(artifact.report.total_entries(), 0);
}

#[test]
fn test_missing_literal_path_is_not_found_and_leaves_nothing() {
    let temp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let missing = temp.path().join("does-not-exist");

    let err = archive_with_config(
        src(&missing),
        &ArchiveConfig::default().with_temp_dir(Some(out.path().to_path_buf())),
    )
    .unwrap_err();

    assert!(matches!(err, ArchiveError::NotFound { .. }));
    assert_eq!(err.code(), "NOT_FOUND");
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_malformed_pattern_is_invalid_pattern() {
    let temp = TempDir::new().unwrap();
    let pattern = format!("{}/[unclosed", temp.path().display());

    let err = archive_to_writer(&pattern, &ArchiveConfig::default(), Vec::new()).unwrap_err();
    assert!(matches!(err, ArchiveError::InvalidPattern { .. }));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_access_denied_and_leaves_nothing() {
    use std::os::unix::fs::PermissionsExt;

    if running_as_root() {
        return;
    }

    let temp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    sample_tree(temp.path());
    let locked = temp.path().join("sub");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let result = archive_with_config(
        src(temp.path()),
        &ArchiveConfig::default().with_temp_dir(Some(out.path().to_path_buf())),
    );

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    assert!(result.unwrap_err().is_access_denied());
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_access_denied_and_leaves_nothing() {
    use std::os::unix::fs::PermissionsExt;

    if running_as_root() {
        return;
    }

    let temp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    sample_tree(temp.path());
    let locked = temp.path().join("sub/b.txt");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let err = archive_with_config(
        src(temp.path()),
        &ArchiveConfig::default().with_temp_dir(Some(out.path().to_path_buf())),
    )
    .unwrap_err();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
    assert!(err.is_access_denied());
    assert_eq!(err.path(), Some(locked.as_path()));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[cfg(target_os = "linux")]
#[test]
fn test_failure_mid_stream_removes_partial_artifact() {
    let temp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let root = path_max_tree(temp.path());

    let err = archive_with_config(
        src(&root),
        &ArchiveConfig::default().with_temp_dir(Some(out.path().to_path_buf())),
    )
    .unwrap_err();

    assert!(matches!(err, ArchiveError::Io(_)), "unexpected error: {err:?}");
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[cfg(target_os = "linux")]
#[test]
fn test_failure_mid_stream_leaves_writer_unterminated() {
    let temp = TempDir::new().unwrap();
    let root = path_max_tree(temp.path());

    let mut bytes = Vec::new();
    let failed = archive_to_writer(src(&root), &ArchiveConfig::default(), &mut bytes).is_err();

    assert!(failed);
    assert!(!bytes.is_empty(), "entries before the failure were written");
    assert_eq!(bytes.len() % 512, 0);
    assert!(!bytes.ends_with(&[0u8; 1024]));
}

#[test]
fn test_failing_writer_is_io_error() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());

    let err = archive_to_writer(
        src(temp.path()),
        &ArchiveConfig::default(),
        FailingSink { budget: 700 },
    )
    .unwrap_err();

    assert!(matches!(err, ArchiveError::Io(_)));
    assert_eq!(err.code(), "IO_ERROR");
}

#[test]
fn test_missing_temp_dir_fails_without_artifact() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());
    let out = TempDir::new().unwrap();
    let missing = out.path().join("not-created");

    let err = archive_with_config(
        src(temp.path()),
        &ArchiveConfig::default().with_temp_dir(Some(missing.clone())),
    )
    .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.path(), Some(missing.as_path()));
    assert!(!missing.exists());
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_double_star_source_yields_unique_names() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("a/b")).unwrap();
    fs::write(temp.path().join("a/b/f.txt"), "f").unwrap();
    fs::write(temp.path().join("top.txt"), "t").unwrap();

    let pattern = format!("{}/**", temp.path().display());
    let (bytes, _, report) =
        archive_to_writer(&pattern, &ArchiveConfig::default(), Vec::new()).unwrap();
    let names = names(&bytes);

    let unique: HashSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), names.len(), "duplicate names: {names:?}");
    assert_eq!(names, vec!["/b", "/b/f.txt", "/top.txt"]);
    assert_eq!(report.roots, 2);
    assert_eq!(report.files_added, 2);
}

#[test]
fn test_digest_is_deterministic_on_unchanged_tree() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());
    let out = TempDir::new().unwrap();
    let config = ArchiveConfig::default().with_temp_dir(Some(out.path().to_path_buf()));

    let first = archive_with_config(src(temp.path()), &config).unwrap();
    let second = archive_with_config(src(temp.path()), &config).unwrap();

    assert_ne!(first.path, second.path);
    assert_eq!(first.checksum, second.checksum);
    assert_eq!(fs::read(&first.path).unwrap(), fs::read(&second.path).unwrap());
}

#[test]
fn test_digest_matches_artifact_bytes() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());
    let out = TempDir::new().unwrap();

    let artifact = Archiver::new(src(temp.path()))
        .temp_dir(out.path())
        .create()
        .unwrap();

    assert_eq!(checksum_file(&artifact.path).unwrap(), artifact.checksum);
    assert!(verify_artifact(&artifact.path, &artifact.checksum_hex())
        .unwrap()
        .matches);
}

#[test]
fn test_deterministic_mode_ignores_timestamps() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    sample_tree(first.path());
    sample_tree(second.path());

    let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
    fs::File::options()
        .write(true)
        .open(second.path().join("a.txt"))
        .unwrap()
        .set_modified(old)
        .unwrap();

    let deterministic = ArchiveConfig::default().with_header_mode(HeaderMode::Deterministic);
    assert_eq!(
        Checksum::of(&to_bytes(src(first.path()), &deterministic)),
        Checksum::of(&to_bytes(src(second.path()), &deterministic))
    );

    let complete = ArchiveConfig::default();
    assert_ne!(
        Checksum::of(&to_bytes(src(first.path()), &complete)),
        Checksum::of(&to_bytes(src(second.path()), &complete))
    );
}

#[test]
fn test_long_names_survive_round_trip() {
    let temp = TempDir::new().unwrap();
    let mut deep = temp.path().to_path_buf();
    for i in 0..8 {
        deep.push(format!("directory-level-{i:02}-with-a-long-name"));
    }
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("leaf.txt"), "leaf").unwrap();

    let entries = read_back(&to_bytes(src(temp.path()), &ArchiveConfig::default()));
    let leaf = entries.last().unwrap();

    assert!(leaf.name.len() > 100);
    assert!(leaf.name.ends_with("/leaf.txt"));
    assert!(leaf.name.starts_with("/directory-level-00-"));
    assert_eq!(leaf.data, b"leaf");
    assert_eq!(entries.len(), 9);
}

#[test]
fn test_list_artifact_reports_manifest() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());
    let out = TempDir::new().unwrap();

    let artifact = Archiver::new(src(temp.path()))
        .prefix("/srv")
        .temp_dir(out.path())
        .create()
        .unwrap();
    let manifest = list_artifact(&artifact.path).unwrap();

    assert_eq!(manifest.len(), artifact.report.total_entries());
    assert_eq!(manifest[0].name, "/srv/a.txt");
    assert_eq!(manifest[0].kind, ManifestEntryKind::Regular);
    assert_eq!(manifest[0].size, 5);
    assert_eq!(manifest[1].kind, ManifestEntryKind::Directory);
}

#[test]
fn test_archive_convenience_uses_system_temp_dir() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());

    let artifact = archive(src(temp.path()), "/").unwrap();
    let (path, hex) = artifact.into_parts();

    assert!(path.is_file());
    assert_eq!(checksum_file(&path).unwrap().to_hex(), hex);
    fs::remove_file(path).unwrap();
}
