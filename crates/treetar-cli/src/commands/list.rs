//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use treetar_core::list_artifact;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let entries = add_context(
        list_artifact(&args.archive),
        &args.archive.display().to_string(),
    )?;

    formatter.format_manifest(&args.archive, &entries, args.long)
}
