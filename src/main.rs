//! symapply - apply matched symbol names to a function naming database
//!
//! A CLI tool that reads a binary diff match report, sanitizes the matched C++ symbols
//! and renames the corresponding auto-named functions, logging every applied rename.

use anyhow::Result;
use clap::Parser;
use symapply::cli::{Args, CliApp};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    init_tracing(args.verbose);

    // Create and run the CLI application
    let app = CliApp::new(args);
    let exit_code = app.run()?;

    // Exit with the appropriate code
    std::process::exit(exit_code);
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the level chosen by `--verbose`
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "symapply=debug" } else { "symapply=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
