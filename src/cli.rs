//! CLI module for the symapply tool
//!
//! This module provides the command-line interface functionality including
//! argument parsing and output formatting.

pub mod args;
pub mod output;

pub use args::{Args, Commands, OutputFormat};
pub use output::{Color, OutputFormatter};

use crate::binary::BinaryAnalyzer;
use crate::database::{ProjectDatabase, SetNameMode};
use crate::naming::Sanitizer;
use crate::rename::{log_path_for, LogEntry, RenameConfig, RenameLog, Renamer};
use anyhow::{anyhow, Result};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main CLI application runner
pub struct CliApp {
    args: Args,
}

impl CliApp {
    /// Create a new CLI application with parsed arguments
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Run the CLI application
    pub fn run(&self) -> Result<i32> {
        match &self.args.command {
            Commands::Apply {
                matches,
                database,
                log,
                dry_run,
                no_check,
                source_label,
            } => {
                let config = RenameConfig {
                    source_label: source_label.clone(),
                    set_name_mode: if *no_check {
                        SetNameMode::NoCheck
                    } else {
                        SetNameMode::Check
                    },
                };
                self.run_apply(matches, database, log.as_deref(), *dry_run, config)
            }
            Commands::Sanitize { symbols } => self.run_sanitize(symbols),
            Commands::Seed { binary, out, force } => self.run_seed(binary, out, *force),
            Commands::Version => self.run_version(),
        }
    }

    fn formatter(&self) -> OutputFormatter {
        OutputFormatter::new(
            self.args.format.clone(),
            !self.args.no_color,
            self.args.verbose,
        )
    }

    /// Run the apply command
    fn run_apply(
        &self,
        matches: &Path,
        database_path: &Path,
        log: Option<&Path>,
        dry_run: bool,
        config: RenameConfig,
    ) -> Result<i32> {
        let input = File::open(matches)
            .map_err(|e| anyhow!("Failed to open match file '{}': {}", matches.display(), e))?;
        let mut database = ProjectDatabase::load(database_path)?;

        let log_path: PathBuf = log.map(Path::to_path_buf).unwrap_or_else(|| log_path_for(matches));
        let rename_log = if dry_run {
            None
        } else {
            Some(RenameLog::create(&log_path)?)
        };

        info!(
            matches = %matches.display(),
            database = %database_path.display(),
            dry_run,
            "applying match report"
        );

        let formatter = self.formatter();
        let mut stdout = io::stdout();
        let summary = Renamer::with_config(&mut database, config)?.run(
            BufReader::new(input),
            |report| {
                if let Err(e) = formatter.write_record_report(&mut stdout, report) {
                    warn!(error = %e, "failed to write status line");
                }
            },
        )?;

        let written_log = match rename_log {
            Some(rename_log) => {
                persist(&database, database_path, rename_log, &summary.log_entries)?;
                Some(log_path.as_path())
            }
            None => None,
        };

        formatter.write_summary(&mut stdout, &summary, written_log)?;
        Ok(0)
    }

    /// Run the sanitize command
    fn run_sanitize(&self, symbols: &[String]) -> Result<i32> {
        let sanitizer = Sanitizer::new()?;
        let pairs: Vec<(String, String)> = symbols
            .iter()
            .map(|raw| (raw.clone(), sanitizer.sanitize(raw)))
            .collect();

        let mut stdout = io::stdout();
        self.formatter().write_sanitized(&mut stdout, &pairs)?;
        Ok(0)
    }

    /// Run the seed command
    fn run_seed(&self, binary_path: &Path, out: &Path, force: bool) -> Result<i32> {
        if out.exists() && !force {
            return Err(anyhow!(
                "Database '{}' already exists (use --force to overwrite)",
                out.display()
            ));
        }

        let binary = BinaryAnalyzer::new().analyze_file(binary_path)?;
        let database = ProjectDatabase::from_binary(&binary);
        database.save(out)?;

        let mut stdout = io::stdout();
        self.formatter()
            .write_seed_result(&mut stdout, &binary, database.len(), out)?;
        Ok(0)
    }

    /// Run the version command
    fn run_version(&self) -> Result<i32> {
        match self.args.format {
            OutputFormat::Json => {
                let version_info = serde_json::json!({
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                    "description": env!("CARGO_PKG_DESCRIPTION"),
                });
                println!("{}", serde_json::to_string_pretty(&version_info)?);
            }
            _ => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                println!("{}", env!("CARGO_PKG_DESCRIPTION"));
            }
        }
        Ok(0)
    }
}

/// Save the database, then flush the log so it never lists unsaved renames
fn persist<W: Write>(
    database: &ProjectDatabase,
    database_path: &Path,
    mut rename_log: RenameLog<W>,
    entries: &[LogEntry],
) -> Result<()> {
    database.save(database_path)?;
    rename_log.write_entries(entries)?;
    rename_log.finish()?;
    Ok(())
}
