//! Builder for archiving with fluent API.

use std::io::Write;
use std::path::Path;

use crate::api::ArchiveArtifact;
use crate::config::ArchiveConfig;
use crate::config::HeaderMode;
use crate::error::ArchiveError;
use crate::error::Result;
use crate::io::Checksum;
use crate::report::ArchiveReport;

/// Builder for archiving a path or pattern with fluent API.
///
/// # Examples
///
/// ```no_run
/// use treetar_core::Archiver;
///
/// let artifact = Archiver::new("/srv/app")
///     .prefix("/app")
///     .deterministic()
///     .create()?;
///
/// println!("{} -> {}", artifact.path.display(), artifact.checksum);
/// # Ok::<(), treetar_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Archiver {
    source: String,
    config: ArchiveConfig,
}

impl Archiver {
    /// Creates a builder for the given source path or glob pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use treetar_core::Archiver;
    ///
    /// let archiver = Archiver::new("data/*.csv");
    /// ```
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            config: ArchiveConfig::default(),
        }
    }

    /// Sets the full configuration.
    #[must_use]
    pub fn config(mut self, config: ArchiveConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the destination prefix prepended to every entry name.
    ///
    /// # Examples
    ///
    /// ```
    /// use treetar_core::Archiver;
    ///
    /// let archiver = Archiver::new("build").prefix("/opt/app");
    /// ```
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Sets how ownership and timestamps are recorded.
    #[must_use]
    pub fn header_mode(mut self, mode: HeaderMode) -> Self {
        self.config.header_mode = mode;
        self
    }

    /// Shorthand for [`HeaderMode::Deterministic`].
    #[must_use]
    pub fn deterministic(self) -> Self {
        self.header_mode(HeaderMode::Deterministic)
    }

    /// Sets whether siblings are visited in file-name order.
    #[must_use]
    pub fn sort_entries(mut self, sort: bool) -> Self {
        self.config.sort_entries = sort;
        self
    }

    /// Sets the directory the artifact is created in.
    #[must_use]
    pub fn temp_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.temp_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets the output buffer capacity in bytes.
    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    /// Archives into a new temporary file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No source was given
    /// - Configuration is invalid
    /// - The source cannot be resolved or read
    /// - The artifact cannot be written
    pub fn create(self) -> Result<ArchiveArtifact> {
        self.check_source()?;
        crate::api::archive_with_config(&self.source, &self.config)
    }

    /// Archives into `writer` instead of a temporary file.
    ///
    /// # Errors
    ///
    /// Same as [`Archiver::create`].
    pub fn write_to<W: Write>(self, writer: W) -> Result<(W, Checksum, ArchiveReport)> {
        self.check_source()?;
        crate::api::archive_to_writer(&self.source, &self.config, writer)
    }

    fn check_source(&self) -> Result<()> {
        if self.source.is_empty() {
            return Err(ArchiveError::InvalidConfiguration {
                reason: "no source provided".to_string(),
            });
        }
        Ok(())
    }
}
