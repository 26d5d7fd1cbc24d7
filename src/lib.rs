//! symapply - apply matched symbol names to a function naming database
//!
//! A library for turning the symbols of a binary diff match report into identifier-safe
//! function names and applying them to the auto-named functions of a target binary's
//! naming database, without overwriting names an analyst already chose.

pub mod binary;
pub mod cli;
pub mod database;
pub mod matches;
pub mod naming;
pub mod rename;

// Re-export main types for convenience
pub use binary::{BinaryAnalyzer, BinaryFormat, BinaryFunctions, Symbol};
pub use cli::{Args, CliApp, OutputFormat};
pub use database::{NameStore, ProjectDatabase, SetNameError, SetNameMode};
pub use matches::MatchRecord;
pub use naming::{decide, sanitize, NamingDecision};
pub use rename::{LogEntry, RecordOutcome, RenameConfig, Renamer, RunSummary};
