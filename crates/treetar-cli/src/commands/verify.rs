//! Verify command implementation

use crate::cli::VerifyArgs;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use treetar_core::verify_artifact;

/// Returns whether the checksum matched; a mismatch is not an error.
pub fn execute(args: &VerifyArgs, formatter: &dyn OutputFormatter) -> Result<bool> {
    let outcome = add_context(
        verify_artifact(&args.archive, &args.checksum),
        &args.archive.display().to_string(),
    )?;

    formatter.format_verify_result(&args.archive, &outcome)?;
    Ok(outcome.matches)
}
