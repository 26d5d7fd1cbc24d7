//! CLI argument parsing module
//!
//! This module defines the command-line interface for the symapply tool.

use crate::rename::DEFAULT_SOURCE_LABEL;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Apply matched symbol names from a binary diff report to a naming database
#[derive(Parser, Debug)]
#[command(name = "symapply")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Apply sanitized symbol names from a diff match report to a naming database")]
#[command(long_about = r#"
symapply reads a tab-separated match report produced by a binary diffing tool,
turns each matched C++ symbol into an identifier-safe name and applies it to the
corresponding auto-named function of a naming database. Functions that already
carry a chosen name are never overwritten.

Examples:
  symapply seed ./target.exe --out target.json           # Build a database from a binary
  symapply apply matches.txt --database target.json      # Apply names, write matches_renamed_log.csv
  symapply apply --dry-run matches.txt -d target.json    # Show what would change
  symapply sanitize 'std::vector<int>::push_back(int)'   # Sanitize a single symbol
"#)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short = 'f', long = "format", global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Suppress colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply the names from a match report to a naming database
    Apply {
        /// Tab-separated match report
        #[arg(value_name = "MATCHES")]
        matches: PathBuf,

        /// Naming database (JSON) to update
        #[arg(short, long, value_name = "DATABASE")]
        database: PathBuf,

        /// Log file path (defaults to <MATCHES stem>_renamed_log.csv next to the report)
        #[arg(long, value_name = "FILE")]
        log: Option<PathBuf>,

        /// Decide and report without writing the database or the log
        #[arg(long)]
        dry_run: bool,

        /// Accept names that are not valid identifiers
        #[arg(long)]
        no_check: bool,

        /// Match source named in function comments
        #[arg(long, default_value = DEFAULT_SOURCE_LABEL)]
        source_label: String,
    },

    /// Print the sanitized form of one or more symbols
    Sanitize {
        /// Raw symbols to sanitize
        #[arg(value_name = "SYMBOL", required = true)]
        symbols: Vec<String>,
    },

    /// Create a naming database from the function symbols of an ELF or PE binary
    Seed {
        /// Path to the binary file
        #[arg(value_name = "BINARY")]
        binary: PathBuf,

        /// Database file to write
        #[arg(short, long, value_name = "DATABASE")]
        out: PathBuf,

        /// Overwrite an existing database file
        #[arg(long)]
        force: bool,
    },

    /// Show version information and exit
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed human-readable output (default)
    Pretty,
    /// JSON output
    Json,
    /// Simple text output (minimal formatting)
    Simple,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Simple => write!(f, "simple"),
        }
    }
}
