//! Source resolution: literal paths and glob patterns to archive roots.
//!
//! A source containing `*`, `?` or `[` is expanded against the filesystem;
//! anything else names exactly one root. Braces are literal characters, as
//! in POSIX shell globbing without brace expansion. Every wildcard matches
//! within a single path component, so `**` behaves like `*`.

use crate::ArchiveError;
use crate::Result;
use globset::GlobBuilder;
use globset::GlobMatcher;
use std::ffi::OsStr;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

const GLOB_METACHARACTERS: [char; 3] = ['*', '?', '['];

/// Returns `true` if `source` contains glob metacharacters.
///
/// # Examples
///
/// ```
/// use treetar_core::resolve::is_pattern;
///
/// assert!(is_pattern("/srv/data/foo*"));
/// assert!(is_pattern("logs/202[0-4]"));
/// assert!(!is_pattern("/srv/data/{literal}"));
/// ```
#[must_use]
pub fn is_pattern(source: &str) -> bool {
    source.contains(GLOB_METACHARACTERS)
}

/// Resolves a source string into a sorted list of absolute root paths.
///
/// Literal paths must exist (checked without following a trailing symlink,
/// so a dangling symlink still resolves). Patterns may match nothing, which
/// yields an empty list.
///
/// # Errors
///
/// - [`ArchiveError::NotFound`] if a literal path does not exist
/// - [`ArchiveError::AccessDenied`] if a literal path cannot be stat'ed
/// - [`ArchiveError::InvalidPattern`] if a pattern is malformed
///
/// # Examples
///
/// ```no_run
/// use treetar_core::resolve::resolve_roots;
///
/// let roots = resolve_roots("/var/lib/app/shard*")?;
/// for root in &roots {
///     println!("{}", root.display());
/// }
/// # Ok::<(), treetar_core::ArchiveError>(())
/// ```
pub fn resolve_roots(source: &str) -> Result<Vec<PathBuf>> {
    let roots = if is_pattern(source) {
        expand_pattern(source)?
    } else {
        vec![resolve_literal(source)?]
    };

    tracing::debug!(source, roots = roots.len(), "resolved source");
    Ok(roots)
}

fn resolve_literal(source: &str) -> Result<PathBuf> {
    if source.is_empty() {
        return Err(ArchiveError::NotFound {
            path: PathBuf::new(),
        });
    }

    let path = std::path::absolute(source).map_err(|e| ArchiveError::from_io(e, source))?;
    fs::symlink_metadata(&path).map_err(|e| ArchiveError::from_io(e, &path))?;
    Ok(path)
}

fn expand_pattern(source: &str) -> Result<Vec<PathBuf>> {
    let absolute = std::path::absolute(source).map_err(|e| ArchiveError::from_io(e, source))?;
    let pattern = SplitPattern::new(source, &absolute)?;

    let depth = pattern.components.len();
    let mut roots: Vec<PathBuf> = WalkDir::new(&pattern.base)
        .follow_links(false)
        .min_depth(depth)
        .max_depth(depth)
        .into_iter()
        .filter_entry(|entry| pattern.may_match(entry.depth(), entry.file_name()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                // Unreadable or vanished directories simply contribute no matches.
                tracing::debug!(error = %err, "skipping unreadable path during glob expansion");
                None
            }
        })
        .map(walkdir::DirEntry::into_path)
        .collect();

    roots.sort();
    Ok(roots)
}

/// A pattern split into its literal base directory and one matcher per
/// path component below it.
struct SplitPattern {
    base: PathBuf,
    components: Vec<GlobMatcher>,
}

impl SplitPattern {
    fn new(source: &str, absolute: &Path) -> Result<Self> {
        let mut base = PathBuf::new();
        let mut rest: Vec<&OsStr> = Vec::new();

        for component in absolute.components() {
            let text = component.as_os_str();
            let literal = rest.is_empty()
                && (!matches!(component, Component::Normal(_))
                    || !text.to_string_lossy().contains(GLOB_METACHARACTERS));
            if literal {
                base.push(text);
            } else {
                rest.push(text);
            }
        }

        let components = rest
            .iter()
            .map(|c| compile(source, &c.to_string_lossy()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { base, components })
    }

    /// Prunes directories whose name cannot lead to a match.
    fn may_match(&self, depth: usize, name: &OsStr) -> bool {
        if depth == 0 {
            return true;
        }
        self.components
            .get(depth - 1)
            .is_some_and(|matcher| matcher.is_match(name))
    }
}

fn compile(source: &str, component: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(&escape_braces(&collapse_stars(component)))
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| ArchiveError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.kind().to_string(),
        })
}

/// Collapses runs of `*` so `**` stays a single-component wildcard.
fn collapse_stars(component: &str) -> String {
    let mut collapsed = String::with_capacity(component.len());
    for ch in component.chars() {
        if ch == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed
}

/// Turns `{` and `}` into single-character classes so they match literally.
fn escape_braces(glob: &str) -> String {
    let mut escaped = String::with_capacity(glob.len());
    for ch in glob.chars() {
        match ch {
            '{' => escaped.push_str("[{]"),
            '}' => escaped.push_str("[}]"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
