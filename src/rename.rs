//! Rename driver
//!
//! Walks a match report one line at a time, sanitizes each matched symbol, asks the
//! [`RenamePolicy`] whether the name may be applied and, if so, applies it through a
//! [`NameStore`]. Every record ends in exactly one [`RecordOutcome`]; a failing record never
//! stops the ones after it. Outcomes are folded into a [`RunSummary`].

pub mod log;

pub use self::log::{log_path_for, LogEntry, RenameLog, LOG_HEADER, LOG_SUFFIX};

use crate::database::{NameStore, SetNameError, SetNameMode, StoreError};
use crate::matches::{format_address, MatchRecord};
use crate::naming::{NamingDecision, RenamePolicy, Sanitizer};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use thiserror::Error;
use tracing::debug;

/// Label written into provenance comments when none is configured
pub const DEFAULT_SOURCE_LABEL: &str = "BinDiff";

/// Configuration for a rename run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameConfig {
    /// Tool that produced the matches, quoted in provenance comments
    pub source_label: String,
    /// Validation mode passed to the name store
    pub set_name_mode: SetNameMode,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            source_label: DEFAULT_SOURCE_LABEL.to_string(),
            set_name_mode: SetNameMode::Check,
        }
    }
}

/// A record that was processed but not renamed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("rename of {address:#x} to '{name}' rejected: {source}")]
    Rejected {
        address: u64,
        name: String,
        #[source]
        source: SetNameError,
    },
    #[error("failed to annotate {address:#x}: {source}")]
    Annotate {
        address: u64,
        #[source]
        source: StoreError,
    },
}

/// Final state of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Name applied and annotated
    Renamed(LogEntry),
    /// Sanitized name is an auto-generated name
    SkippedReserved,
    /// Function already carries a chosen name
    SkippedAlreadyNamed { current_name: String },
    /// Rename attempted and refused, or a later step failed
    Failed(RecordError),
}

impl RecordOutcome {
    /// Policy-level view of the outcome
    pub fn decision(&self) -> NamingDecision {
        match self {
            RecordOutcome::Renamed(_) => NamingDecision::Apply,
            RecordOutcome::SkippedReserved => NamingDecision::SkipReserved,
            RecordOutcome::SkippedAlreadyNamed { .. } => NamingDecision::SkipAlreadyNamed,
            RecordOutcome::Failed(_) => NamingDecision::Fail,
        }
    }
}

/// A processed record together with its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    /// 1-based line number in the match file
    pub line_number: usize,
    /// The line as read
    pub line: String,
    pub record: MatchRecord,
    pub sanitized_name: String,
    pub outcome: RecordOutcome,
}

/// Counters and log rows accumulated over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub renamed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Applied renames in input order
    pub log_entries: Vec<LogEntry>,
}

impl RunSummary {
    /// Fold one outcome into the summary
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Renamed(entry) => {
                self.renamed += 1;
                self.log_entries.push(entry.clone());
            }
            RecordOutcome::SkippedReserved | RecordOutcome::SkippedAlreadyNamed { .. } => {
                self.skipped += 1
            }
            RecordOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Records that reached a terminal outcome
    pub fn total(&self) -> usize {
        self.renamed + self.failed + self.skipped
    }
}

impl<'a> FromIterator<&'a RecordOutcome> for RunSummary {
    fn from_iter<I: IntoIterator<Item = &'a RecordOutcome>>(outcomes: I) -> Self {
        outcomes.into_iter().fold(Self::default(), |mut summary, outcome| {
            summary.record(outcome);
            summary
        })
    }
}

/// Applies matched names to a [`NameStore`]
pub struct Renamer<'s, S: NameStore> {
    store: &'s mut S,
    config: RenameConfig,
    sanitizer: Sanitizer,
    policy: RenamePolicy,
}

impl<'s, S: NameStore> Renamer<'s, S> {
    pub fn new(store: &'s mut S) -> Result<Self> {
        Self::with_config(store, RenameConfig::default())
    }

    pub fn with_config(store: &'s mut S, config: RenameConfig) -> Result<Self> {
        Ok(Self {
            store,
            config,
            sanitizer: Sanitizer::new()?,
            policy: RenamePolicy::new()?,
        })
    }

    /// Process every line of a match report
    ///
    /// `on_report` sees each processed record as soon as its outcome is known. Comment lines
    /// and malformed records are skipped without being reported or counted. Only a read
    /// failure aborts the run.
    pub fn run<R, F>(&mut self, mut reader: R, mut on_report: F) -> Result<RunSummary>
    where
        R: BufRead,
        F: FnMut(&RecordReport),
    {
        let mut summary = RunSummary::default();
        let mut buf = Vec::new();
        let mut line_number = 0;

        loop {
            buf.clear();
            line_number += 1;
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| anyhow!("Failed to read line {}: {}", line_number, e))?;
            if read == 0 {
                break;
            }

            // Invalid UTF-8 only affects this record
            let line = String::from_utf8_lossy(strip_line_ending(&buf));
            if let Some(report) = self.process_line(line_number, &line) {
                summary.record(&report.outcome);
                on_report(&report);
            }
        }

        Ok(summary)
    }

    /// Parse and process one line, returning `None` for comments and malformed records
    pub fn process_line(&mut self, line_number: usize, line: &str) -> Option<RecordReport> {
        let record = match MatchRecord::parse_line(line) {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                debug!(line = line_number, error = %e, "dropping malformed record");
                return None;
            }
        };

        let sanitized_name = self.sanitizer.sanitize(&record.raw_new_name);
        let outcome = self.process_record(&record, &sanitized_name);

        Some(RecordReport {
            line_number,
            line: line.to_string(),
            record,
            sanitized_name,
            outcome,
        })
    }

    /// Decide on and, when allowed, apply `sanitized_name` for `record`
    pub fn process_record(&mut self, record: &MatchRecord, sanitized_name: &str) -> RecordOutcome {
        let current_name = self.store.get_current_name(record.address);

        match self.policy.decide(&current_name, sanitized_name) {
            NamingDecision::SkipReserved => RecordOutcome::SkippedReserved,
            NamingDecision::SkipAlreadyNamed => RecordOutcome::SkippedAlreadyNamed { current_name },
            NamingDecision::Apply | NamingDecision::Fail => {
                match self.apply(record, sanitized_name) {
                    Ok(entry) => RecordOutcome::Renamed(entry),
                    Err(e) => {
                        debug!(address = %format_address(record.address), error = %e, "rename failed");
                        RecordOutcome::Failed(e)
                    }
                }
            }
        }
    }

    fn apply(&mut self, record: &MatchRecord, sanitized_name: &str) -> Result<LogEntry, RecordError> {
        self.store
            .set_name(record.address, sanitized_name, self.config.set_name_mode)
            .map_err(|source| RecordError::Rejected {
                address: record.address,
                name: sanitized_name.to_string(),
                source,
            })?;

        let comment = self.provenance_comment(record);
        self.store
            .annotate(record.address, &comment)
            .map_err(|source| RecordError::Annotate {
                address: record.address,
                source,
            })?;

        Ok(LogEntry {
            address: record.address,
            old_name: record.old_name.clone(),
            new_name: sanitized_name.to_string(),
            full_symbol: record.raw_new_name.clone(),
        })
    }

    /// Comment recording where a name came from
    pub fn provenance_comment(&self, record: &MatchRecord) -> String {
        format!(
            "Renamed by {}: originally '{}', matched symbol: '{}'",
            self.config.source_label, record.old_name, record.raw_new_name
        )
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ProjectDatabase;
    use std::collections::HashMap;
    use std::io::Cursor;

    /// Store that records every call and can be told to fail
    #[derive(Default)]
    struct RecordingStore {
        names: HashMap<u64, String>,
        set_name_calls: Vec<(u64, String, SetNameMode)>,
        comments: HashMap<u64, String>,
        reject: Option<SetNameError>,
        fail_annotate: bool,
    }

    impl NameStore for RecordingStore {
        fn get_current_name(&self, address: u64) -> String {
            self.names.get(&address).cloned().unwrap_or_default()
        }

        fn set_name(
            &mut self,
            address: u64,
            candidate: &str,
            mode: SetNameMode,
        ) -> Result<(), SetNameError> {
            self.set_name_calls.push((address, candidate.to_string(), mode));
            if let Some(error) = &self.reject {
                return Err(error.clone());
            }
            self.names.insert(address, candidate.to_string());
            Ok(())
        }

        fn annotate(&mut self, address: u64, comment: &str) -> Result<(), StoreError> {
            if self.fail_annotate {
                return Err(StoreError::NoFunction(address));
            }
            self.comments.insert(address, comment.to_string());
            Ok(())
        }
    }

    fn match_line(address: &str, old_name: &str, raw_new_name: &str) -> String {
        format!("0.9\t0.8\tGI-JE--\t{}\t{}\tunused\t{}", address, old_name, raw_new_name)
    }

    fn run(store: &mut RecordingStore, input: &str) -> (RunSummary, Vec<RecordReport>) {
        let mut reports = Vec::new();
        let summary = Renamer::new(store)
            .unwrap()
            .run(Cursor::new(input), |report| reports.push(report.clone()))
            .unwrap();
        (summary, reports)
    }

    #[test]
    fn test_apply_to_auto_named_function() {
        let mut store = RecordingStore::default();
        store.names.insert(0x401000, "sub_401000".to_string());

        let (summary, reports) = run(&mut store, &match_line("401000", "sub_401000", "Foo::Bar(int)"));

        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped, 0);
        assert_eq!(
            store.set_name_calls,
            vec![(0x401000, "Foo_Bar".to_string(), SetNameMode::Check)]
        );
        assert_eq!(
            store.comments[&0x401000],
            "Renamed by BinDiff: originally 'sub_401000', matched symbol: 'Foo::Bar(int)'"
        );

        let expected = LogEntry {
            address: 0x401000,
            old_name: "sub_401000".to_string(),
            new_name: "Foo_Bar".to_string(),
            full_symbol: "Foo::Bar(int)".to_string(),
        };
        assert_eq!(summary.log_entries, vec![expected.clone()]);
        assert_eq!(reports[0].outcome, RecordOutcome::Renamed(expected));
        assert_eq!(reports[0].sanitized_name, "Foo_Bar");
        assert_eq!(reports[0].line_number, 1);
    }

    #[test]
    fn test_destructor_applied_to_unnamed_function() {
        let mut store = RecordingStore::default();

        let (summary, reports) = run(&mut store, &match_line("10", "", "MyClass::~MyClass()"));

        assert_eq!(summary.renamed, 1);
        assert_eq!(reports[0].sanitized_name, "MyClass_destructor");
        assert_eq!(store.get_current_name(0x10), "MyClass_destructor");
    }

    #[test]
    fn test_reserved_candidate_is_skipped() {
        for current in ["", "sub_401000", "RealAnalystName"] {
            let mut store = RecordingStore::default();
            store.names.insert(0x401000, current.to_string());

            let (summary, reports) = run(&mut store, &match_line("401000", "old", "sub_4010AA"));

            assert_eq!(summary.skipped, 1);
            assert!(summary.log_entries.is_empty());
            assert!(store.set_name_calls.is_empty());
            assert_eq!(reports[0].outcome.decision(), NamingDecision::SkipReserved);
        }
    }

    #[test]
    fn test_existing_name_is_never_overwritten() {
        let mut store = RecordingStore::default();
        store.names.insert(0x401000, "RealAnalystName".to_string());

        let (summary, reports) = run(&mut store, &match_line("401000", "old", "Foo::Bar(int)"));

        assert_eq!(summary.skipped, 1);
        assert!(store.set_name_calls.is_empty());
        assert!(store.comments.is_empty());
        assert_eq!(
            reports[0].outcome,
            RecordOutcome::SkippedAlreadyNamed {
                current_name: "RealAnalystName".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_and_comment_lines_are_not_counted() {
        let mut store = RecordingStore::default();
        let bad_address = match_line("not-hex", "old", "Foo");
        let input = [
            "# header line",
            "",
            "a\tb\tc\t401000\tsub_401000",
            bad_address.as_str(),
        ]
        .join("\n");

        let (summary, reports) = run(&mut store, &input);

        assert_eq!(summary, RunSummary::default());
        assert!(reports.is_empty());
        assert!(store.set_name_calls.is_empty());
    }

    #[test]
    fn test_rejected_rename_fails_and_continues() {
        let mut store = RecordingStore {
            reject: Some(SetNameError::Collision {
                name: "Foo_Bar".to_string(),
                address: 0x500000,
            }),
            ..Default::default()
        };
        let input = [
            match_line("401000", "sub_401000", "Foo::Bar(int)"),
            match_line("402000", "sub_402000", "sub_402000"),
        ]
        .join("\n");

        let (summary, reports) = run(&mut store, &input);

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.renamed, 0);
        assert!(summary.log_entries.is_empty());
        assert!(store.comments.is_empty());
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].outcome.decision(), NamingDecision::Fail);
        assert_eq!(reports[1].line_number, 2);
    }

    #[test]
    fn test_degenerate_name_reaches_store_and_fails() {
        let mut db = ProjectDatabase::new();
        let mut reports = Vec::new();
        let summary = Renamer::new(&mut db)
            .unwrap()
            .run(Cursor::new(match_line("401000", "", "(int)")), |report| {
                reports.push(report.clone())
            })
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(reports[0].sanitized_name, "");
        assert_eq!(
            reports[0].outcome,
            RecordOutcome::Failed(RecordError::Rejected {
                address: 0x401000,
                name: String::new(),
                source: SetNameError::Empty,
            })
        );
    }

    #[test]
    fn test_annotation_failure_counts_as_failed() {
        let mut store = RecordingStore {
            fail_annotate: true,
            ..Default::default()
        };

        let (summary, reports) = run(&mut store, &match_line("401000", "", "Foo"));

        assert_eq!(summary.failed, 1);
        assert!(summary.log_entries.is_empty());
        assert!(matches!(
            reports[0].outcome,
            RecordOutcome::Failed(RecordError::Annotate { address: 0x401000, .. })
        ));
    }

    #[test]
    fn test_custom_config() {
        let mut store = RecordingStore::default();
        let config = RenameConfig {
            source_label: "Diaphora".to_string(),
            set_name_mode: SetNameMode::NoCheck,
        };
        let mut renamer = Renamer::with_config(&mut store, config).unwrap();
        renamer
            .run(Cursor::new(match_line("20", "x", "ns::f()")), |_| {})
            .unwrap();

        assert_eq!(store.set_name_calls[0].2, SetNameMode::NoCheck);
        assert!(store.comments[&0x20].starts_with("Renamed by Diaphora:"));
    }

    #[test]
    fn test_invalid_utf8_line_does_not_abort_run() {
        let mut store = RecordingStore::default();
        let mut input = Vec::new();
        input.extend_from_slice(match_line("10", "", "First").as_bytes());
        input.extend_from_slice(b"\r\n");
        input.extend_from_slice(b"0.9\t0.8\tGI\t20\t\tunused\tFo\xffo\r\n");
        input.extend_from_slice(match_line("30", "", "Third").as_bytes());

        let mut reports = Vec::new();
        let summary = Renamer::new(&mut store)
            .unwrap()
            .run(Cursor::new(input), |report| reports.push(report.clone()))
            .unwrap();

        assert_eq!(summary.renamed, 3);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[1].line_number, 2);
        assert_eq!(reports[1].sanitized_name, "Fo_o");
        assert!(!reports[0].line.ends_with('\r'));
        assert_eq!(store.names[&0x30], "Third");
    }

    #[test]
    fn test_summary_fold() {
        let entry = LogEntry {
            address: 1,
            old_name: String::new(),
            new_name: "a".to_string(),
            full_symbol: "a".to_string(),
        };
        let outcomes = vec![
            RecordOutcome::Renamed(entry.clone()),
            RecordOutcome::SkippedReserved,
            RecordOutcome::SkippedAlreadyNamed {
                current_name: "x".to_string(),
            },
            RecordOutcome::Failed(RecordError::Annotate {
                address: 1,
                source: StoreError::NoFunction(1),
            }),
        ];

        let summary: RunSummary = outcomes.iter().collect();
        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.log_entries, vec![entry]);
    }
}
