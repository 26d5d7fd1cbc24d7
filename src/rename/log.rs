//! CSV log of applied renames

use crate::matches::format_address;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix that replaces the match file's extension to form the log file name
pub const LOG_SUFFIX: &str = "_renamed_log.csv";

/// Column headers of the log
pub const LOG_HEADER: [&str; 4] = ["Address", "Original Name", "New Name", "Full Symbol"];

/// One applied rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub address: u64,
    /// Name the diffing tool reported for the function
    pub old_name: String,
    /// Name that was applied
    pub new_name: String,
    /// Raw matched symbol the name was derived from
    pub full_symbol: String,
}

impl LogEntry {
    fn to_record(&self) -> [String; 4] {
        [
            format_address(self.address),
            self.old_name.clone(),
            self.new_name.clone(),
            self.full_symbol.clone(),
        ]
    }
}

/// Default log location for a match file: `dir/matches.txt` → `dir/matches_renamed_log.csv`
pub fn log_path_for(match_file: &Path) -> PathBuf {
    let stem = match_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    match_file.with_file_name(format!("{}{}", stem, LOG_SUFFIX))
}

/// Writer for the rename log
pub struct RenameLog<W: Write> {
    writer: csv::Writer<W>,
}

impl RenameLog<File> {
    /// Create (or truncate) the log file and write its header
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| anyhow!("Failed to create log file '{}': {}", path.display(), e))?;

        Self::from_writer(file)
    }
}

impl<W: Write> RenameLog<W> {
    /// Wrap a writer and write the header row
    pub fn from_writer(writer: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);
        writer.write_record(LOG_HEADER)?;

        Ok(Self { writer })
    }

    pub fn write_entry(&mut self, entry: &LogEntry) -> Result<()> {
        self.writer.write_record(entry.to_record())?;
        Ok(())
    }

    pub fn write_entries<'a>(&mut self, entries: impl IntoIterator<Item = &'a LogEntry>) -> Result<()> {
        for entry in entries {
            self.write_entry(entry)?;
        }
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush rename log: {}", e.error()))
    }
}
