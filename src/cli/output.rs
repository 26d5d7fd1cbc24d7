//! CLI output formatting module
//!
//! This module renders per-record status lines and run summaries in the supported
//! output formats (pretty, JSON, simple text).

use crate::binary::BinaryFunctions;
use crate::cli::args::OutputFormat;
use crate::matches::format_address;
use crate::naming::is_reserved_auto_name;
use crate::rename::{RecordError, RecordOutcome, RecordReport, RunSummary};
use anyhow::Result;
use colored::*;
use std::io::Write;
use std::path::Path;

/// Main output formatter that handles different formats
pub struct OutputFormatter {
    format: OutputFormat,
    use_color: bool,
    verbose: bool,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(format: OutputFormat, use_color: bool, verbose: bool) -> Self {
        Self {
            format,
            use_color,
            verbose,
        }
    }

    /// Write the status line for one processed record
    ///
    /// JSON output reports records only in the final summary.
    pub fn write_record_report<W: Write>(&self, writer: &mut W, report: &RecordReport) -> Result<()> {
        match self.format {
            OutputFormat::Pretty => self.write_pretty_report(writer, report),
            OutputFormat::Simple => self.write_simple_report(writer, report),
            OutputFormat::Json => Ok(()),
        }
    }

    fn write_pretty_report<W: Write>(&self, writer: &mut W, report: &RecordReport) -> Result<()> {
        let address = format_address(report.record.address);

        match &report.outcome {
            RecordOutcome::Renamed(entry) => writeln!(
                writer,
                "{} {}: {} → {}",
                self.colorize("[✓]", Color::Green),
                address,
                entry.old_name,
                entry.new_name
            )?,
            RecordOutcome::SkippedReserved => writeln!(
                writer,
                "{} Skipping reserved auto-name: {}",
                self.colorize("[!]", Color::Yellow),
                report.sanitized_name
            )?,
            RecordOutcome::SkippedAlreadyNamed { current_name } => writeln!(
                writer,
                "{} Skipped {} ({}), already renamed",
                self.colorize("[=]", Color::Cyan),
                address,
                current_name
            )?,
            RecordOutcome::Failed(RecordError::Rejected { name, source, .. }) => writeln!(
                writer,
                "{} Failed to rename {} to '{}' ({})",
                self.colorize("[!]", Color::Red),
                address,
                name,
                source
            )?,
            RecordOutcome::Failed(error) => writeln!(
                writer,
                "{} Error processing line {}: {} - {}",
                self.colorize("[!]", Color::Red),
                report.line_number,
                report.line.trim(),
                error
            )?,
        }

        if self.verbose {
            writeln!(
                writer,
                "    line {}: {} ({})",
                report.line_number,
                report.record.raw_new_name,
                report.outcome.decision()
            )?;
        }

        Ok(())
    }

    fn write_simple_report<W: Write>(&self, writer: &mut W, report: &RecordReport) -> Result<()> {
        let status = match report.outcome {
            RecordOutcome::Renamed(_) => "renamed",
            RecordOutcome::SkippedReserved | RecordOutcome::SkippedAlreadyNamed { .. } => "skipped",
            RecordOutcome::Failed(_) => "failed",
        };

        writeln!(
            writer,
            "{} {} {}",
            status,
            format_address(report.record.address),
            report.sanitized_name
        )?;
        Ok(())
    }

    /// Write the end-of-run summary
    ///
    /// `log_path` is `None` when nothing was written (dry run).
    pub fn write_summary<W: Write>(
        &self,
        writer: &mut W,
        summary: &RunSummary,
        log_path: Option<&Path>,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "summary": {
                        "renamed": summary.renamed,
                        "failed": summary.failed,
                        "skipped": summary.skipped,
                    },
                    "dry_run": log_path.is_none(),
                    "log_file": log_path.map(|path| path.display().to_string()),
                    "renames": summary.log_entries.iter().map(|entry| serde_json::json!({
                        "address": format_address(entry.address),
                        "original_name": entry.old_name,
                        "new_name": entry.new_name,
                        "full_symbol": entry.full_symbol,
                    })).collect::<Vec<_>>(),
                });
                writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
            }
            OutputFormat::Simple => {
                writeln!(writer, "Renamed: {}", summary.renamed)?;
                writeln!(writer, "Failed: {}", summary.failed)?;
                writeln!(writer, "Skipped: {}", summary.skipped)?;
                if let Some(path) = log_path {
                    writeln!(writer, "Log: {}", path.display())?;
                }
            }
            OutputFormat::Pretty => {
                writeln!(writer)?;
                writeln!(writer, "{}", self.colorize("Summary:", Color::Cyan))?;
                writeln!(
                    writer,
                    "{} Renamed: {}",
                    self.colorize("✔", Color::Green),
                    summary.renamed
                )?;
                writeln!(
                    writer,
                    "{} Failed : {}",
                    self.colorize("✘", Color::Red),
                    summary.failed
                )?;
                writeln!(
                    writer,
                    "{} Skipped: {}",
                    self.colorize("⏭", Color::Yellow),
                    summary.skipped
                )?;
                match log_path {
                    Some(path) => writeln!(writer, "📄 Log written to: {}", path.display())?,
                    None => writeln!(
                        writer,
                        "{}",
                        self.colorize(
                            "Dry run: database and log were not written",
                            Color::Yellow
                        )
                    )?,
                }
            }
        }
        Ok(())
    }

    /// Write sanitized forms of raw symbols
    pub fn write_sanitized<W: Write>(&self, writer: &mut W, pairs: &[(String, String)]) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let output: Vec<_> = pairs
                    .iter()
                    .map(|(raw, sanitized)| {
                        serde_json::json!({
                            "raw": raw,
                            "sanitized": sanitized,
                            "reserved": is_reserved_auto_name(sanitized),
                        })
                    })
                    .collect();
                writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
            }
            OutputFormat::Simple => {
                for (_, sanitized) in pairs {
                    writeln!(writer, "{}", sanitized)?;
                }
            }
            OutputFormat::Pretty => {
                for (raw, sanitized) in pairs {
                    let shown = if sanitized.is_empty() {
                        self.colorize("(empty)", Color::Red)
                    } else if is_reserved_auto_name(sanitized) {
                        format!(
                            "{} {}",
                            sanitized,
                            self.colorize("(reserved auto-name)", Color::Yellow)
                        )
                    } else {
                        self.colorize(sanitized, Color::Green)
                    };
                    writeln!(writer, "{} → {}", raw, shown)?;
                }
            }
        }
        Ok(())
    }

    /// Write the result of seeding a database from a binary
    pub fn write_seed_result<W: Write>(
        &self,
        writer: &mut W,
        binary: &BinaryFunctions,
        named: usize,
        out: &Path,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "binary": {
                        "path": binary.info.path,
                        "format": binary.info.format.to_string(),
                        "architecture": binary.info.architecture,
                        "bitness": binary.info.bitness,
                        "entry_point": binary.info.entry_point.map(format_address),
                    },
                    "function_symbols": binary.functions.len(),
                    "functions_named": named,
                    "database": out.display().to_string(),
                });
                writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
            }
            _ => {
                writeln!(
                    writer,
                    "Seeded {} functions from {} ({}, {}, {}-bit) into {}",
                    named,
                    binary.info.path,
                    self.colorize(&binary.info.format.to_string(), Color::Green),
                    binary.info.architecture,
                    binary.info.bitness,
                    out.display()
                )?;
                if self.verbose && !binary.info.dependencies.is_empty() {
                    writeln!(writer, "Dependencies:")?;
                    for dep in &binary.info.dependencies {
                        writeln!(writer, "  - {}", dep)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply color to text if colors are enabled
    pub fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_color {
            match color {
                Color::Red => text.red().to_string(),
                Color::Green => text.green().to_string(),
                Color::Yellow => text.yellow().to_string(),
                Color::Cyan => text.cyan().to_string(),
            }
        } else {
            text.to_string()
        }
    }
}

/// Color enumeration for output formatting
#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Cyan,
}
