//! Function naming database module
//!
//! The renamer never talks to a concrete database directly. It goes through the
//! [`NameStore`] trait, which exposes the three operations a naming backend must offer:
//! reading the current name at an address, assigning a new one and attaching a comment.
//! [`ProjectDatabase`] is the JSON-file backed implementation used by the CLI.

pub mod common;
pub mod project;

pub use common::{validate_identifier, NameStore, SetNameError, SetNameMode, StoreError};
pub use project::{FunctionEntry, ProjectDatabase};
