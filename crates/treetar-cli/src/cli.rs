//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "treetar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (also raises the log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Archive a path or glob pattern into a new temporary tar file
    Archive(ArchiveArgs),
    /// List the entries of an archive
    List(ListArgs),
    /// Verify an archive against an expected SHA-256 checksum
    Verify(VerifyArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct ArchiveArgs {
    /// Path or glob pattern to archive (quote patterns to keep the shell off them)
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Prefix prepended to every entry name
    #[arg(short, long, default_value = "/", value_name = "PREFIX")]
    pub prefix: String,

    /// Zero ownership and timestamps for reproducible checksums
    #[arg(short, long)]
    pub deterministic: bool,

    /// Keep directory entries in filesystem order instead of sorting them
    #[arg(long)]
    pub no_sort: bool,

    /// Directory to create the archive in (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show mode, ownership, size and link targets
    #[arg(short, long)]
    pub long: bool,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Expected SHA-256 checksum (hex)
    #[arg(value_name = "CHECKSUM")]
    pub checksum: String,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum, value_name = "SHELL")]
    pub shell: Shell,
}
