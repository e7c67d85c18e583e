//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use std::path::Path;
use treetar_core::ArchiveArtifact;
use treetar_core::ManifestEntry;
use treetar_core::ManifestEntryKind;
use treetar_core::VerifyOutcome;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    /// Renders `ls -l` style permissions, e.g. `drwxr-xr-x`.
    fn format_mode(kind: ManifestEntryKind, mode: u32) -> String {
        let type_char = match kind {
            ManifestEntryKind::Regular => '-',
            ManifestEntryKind::Directory => 'd',
            ManifestEntryKind::Symlink => 'l',
            ManifestEntryKind::Other(_) => '?',
        };

        let mut out = String::with_capacity(10);
        out.push(type_char);
        for shift in [6, 3, 0] {
            let bits = (mode >> shift) & 0o7;
            out.push(if bits & 0o4 == 0 { '-' } else { 'r' });
            out.push(if bits & 0o2 == 0 { '-' } else { 'w' });
            out.push(if bits & 0o1 == 0 { '-' } else { 'x' });
        }
        out
    }

    fn write_status(&self, ok: bool, message: &str) {
        let line = match (self.use_colors, ok) {
            (true, true) => format!("{} {message}", style("✓").green().bold()),
            (true, false) => format!("{} {message}", style("✗").red().bold()),
            (false, _) => message.to_string(),
        };
        let _ = self.term.write_line(&line);
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_archive_result(&self, artifact: &ArchiveArtifact) -> Result<()> {
        let report = &artifact.report;

        if self.quiet {
            // sha256sum layout, so the result can be piped into `sha256sum -c`
            let _ = self.term.write_line(&format!(
                "{}  {}",
                artifact.checksum,
                artifact.path.display()
            ));
            return Ok(());
        }

        self.write_status(
            true,
            &format!("Archive created: {}", artifact.path.display()),
        );
        let _ = self.term.write_line("");
        let _ = self
            .term
            .write_line(&format!("  SHA-256:          {}", artifact.checksum));
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_added)
        ));
        let _ = self.term.write_line(&format!(
            "  Symlinks:         {}",
            Self::format_number(report.symlinks_added)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.archive_bytes)
        ));

        if report.special_files_skipped > 0 {
            let _ = self.term.write_line(&format!(
                "  Special skipped:  {}",
                report.special_files_skipped
            ));
        }

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Roots:            {}", report.roots));
            let _ = self.term.write_line(&format!(
                "  Content size:     {}",
                Self::format_size(report.content_bytes)
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }

        Ok(())
    }

    fn format_manifest(&self, _archive: &Path, entries: &[ManifestEntry], long: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if !long {
            for entry in entries {
                let _ = self.term.write_line(&entry.name);
            }
            return Ok(());
        }

        let mut total_size = 0u64;
        for entry in entries {
            total_size += entry.size;
            let target = entry
                .link_target
                .as_ref()
                .map_or_else(String::new, |t| format!(" -> {t}"));

            let _ = self.term.write_line(&format!(
                "{} {:>5}/{:<5} {:>10}  {}{}",
                Self::format_mode(entry.kind, entry.mode),
                entry.uid,
                entry.gid,
                entry.size,
                entry.name,
                target
            ));
        }

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "Total: {} entries, {}",
            Self::format_number(entries.len()),
            Self::format_size(total_size)
        ));

        Ok(())
    }

    fn format_verify_result(&self, archive: &Path, outcome: &VerifyOutcome) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if outcome.matches {
            self.write_status(true, &format!("Checksum OK: {}", archive.display()));
        } else {
            self.write_status(false, &format!("Checksum mismatch: {}", archive.display()));
            let _ = self
                .term
                .write_line(&format!("  Expected: {}", outcome.expected));
            let _ = self
                .term
                .write_line(&format!("  Actual:   {}", outcome.actual));
        }

        if self.verbose && outcome.matches {
            let _ = self
                .term
                .write_line(&format!("  SHA-256: {}", outcome.actual));
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}
