//! dirseek - find files by exact name across a directory tree
//!
//! dirseek provides:
//! - Exact, optionally case-insensitive, name matching
//! - Recursive search with one worker thread per directory
//! - Streaming output (line/jsonl) as matches are found

use anyhow::{anyhow, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod backends;
mod cli;
mod core;

fn main() -> ExitCode {
    let (args, unknown) = cli::screen_unknown_options(std::env::args_os().collect());
    for option in &unknown {
        eprintln!("unknown option: {}", option);
    }

    let cli = cli::Cli::parse_from(args);

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Warning: {:#}", e);
    }

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr so they never mix with matches
fn setup_logging(verbose: u8) -> Result<()> {
    let filter = match verbose {
        0 => EnvFilter::new("dirseek=error"),
        1 => EnvFilter::new("dirseek=debug,warn"),
        _ => EnvFilter::new("dirseek=trace,warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(verbose > 1)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}
