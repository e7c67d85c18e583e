//! treetar CLI - content-addressed tar snapshots of directory trees.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let (operation, result) = match &cli.command {
        cli::Commands::Archive(args) => (
            "archive",
            commands::archive::execute(args, &*formatter).map(|()| true),
        ),
        cli::Commands::List(args) => (
            "list",
            commands::list::execute(args, &*formatter).map(|()| true),
        ),
        cli::Commands::Verify(args) => ("verify", commands::verify::execute(args, &*formatter)),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            ("completion", Ok(true))
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            formatter.format_error(operation, &err);
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the `--verbose` default.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
