//! Rename decision policy

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Prefix the analysis database gives functions it named automatically
pub const AUTO_FUNCTION_PREFIX: &str = "sub_";

static DEFAULT_POLICY: LazyLock<RenamePolicy> = LazyLock::new(RenamePolicy::default);

/// Decide with the shared default [`RenamePolicy`]
pub fn decide(current_name: &str, sanitized_name: &str) -> NamingDecision {
    DEFAULT_POLICY.decide(current_name, sanitized_name)
}

/// Whether `name` is one of the database's own auto-generated names
pub fn is_reserved_auto_name(name: &str) -> bool {
    DEFAULT_POLICY.is_reserved(name)
}

/// What to do with a candidate name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamingDecision {
    /// Attempt the rename
    Apply,
    /// Candidate is an auto-generated name (`sub_`, `loc_`, `off_` + hex)
    SkipReserved,
    /// The function already carries a name someone chose
    SkipAlreadyNamed,
    /// The rename was attempted and rejected
    Fail,
}

impl std::fmt::Display for NamingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamingDecision::Apply => write!(f, "apply"),
            NamingDecision::SkipReserved => write!(f, "skip-reserved"),
            NamingDecision::SkipAlreadyNamed => write!(f, "skip-already-named"),
            NamingDecision::Fail => write!(f, "fail"),
        }
    }
}

/// Policy deciding whether a sanitized name may replace the current one
pub struct RenamePolicy {
    reserved: Regex,
}

impl RenamePolicy {
    pub fn new() -> Result<Self> {
        Ok(Self {
            reserved: Regex::new(r"^(sub|loc|off)_[0-9A-Fa-f]+$")?,
        })
    }

    /// Decide what to do with `sanitized_name` given the name currently at the address
    ///
    /// Never returns [`NamingDecision::Fail`]; that outcome only arises once an
    /// [`NamingDecision::Apply`] is rejected by the name store.
    pub fn decide(&self, current_name: &str, sanitized_name: &str) -> NamingDecision {
        if self.is_reserved(sanitized_name) {
            NamingDecision::SkipReserved
        } else if current_name.is_empty() || current_name.starts_with(AUTO_FUNCTION_PREFIX) {
            NamingDecision::Apply
        } else {
            NamingDecision::SkipAlreadyNamed
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.is_match(name)
    }
}

impl Default for RenamePolicy {
    fn default() -> Self {
        Self::new().expect("Failed to compile reserved name pattern")
    }
}
