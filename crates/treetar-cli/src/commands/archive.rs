//! Archive command implementation.

use crate::cli::ArchiveArgs;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use treetar_core::Archiver;
use treetar_core::HeaderMode;

pub fn execute(args: &ArchiveArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut archiver = Archiver::new(args.source.as_str())
        .prefix(args.prefix.as_str())
        .sort_entries(!args.no_sort);
    if args.deterministic {
        archiver = archiver.header_mode(HeaderMode::Deterministic);
    }
    if let Some(dir) = &args.temp_dir {
        archiver = archiver.temp_dir(dir);
    }

    let artifact = add_context(archiver.create(), &args.source)?;
    tracing::info!(
        path = %artifact.path.display(),
        checksum = %artifact.checksum,
        "archive created"
    );

    formatter.format_archive_result(&artifact)
}
