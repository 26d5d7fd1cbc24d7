//! Symbol naming module
//!
//! This module turns raw (mangled, demangled, templated or scoped) C++ symbols into
//! identifier-safe function names and decides whether such a name may be applied
//! to a function in the naming database.

pub mod policy;
pub mod sanitize;

pub use policy::{decide, is_reserved_auto_name, NamingDecision, RenamePolicy};
pub use sanitize::{sanitize, Sanitizer};
