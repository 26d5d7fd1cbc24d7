//! Common types and traits for naming databases

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How strictly `set_name` validates a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SetNameMode {
    /// Reject names that are not valid identifiers
    #[default]
    Check,
    /// Accept any non-empty name that does not collide
    NoCheck,
}

/// Reasons a naming backend refuses a name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetNameError {
    #[error("name is empty")]
    Empty,
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("'{name}' is already used at {address:#x}")]
    Collision { name: String, address: u64 },
}

/// Failures of other naming backend operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no function at {0:#x}")]
    NoFunction(u64),
}

/// Access to the names assigned to functions of the target binary
pub trait NameStore {
    /// Name currently assigned at `address`, or an empty string if there is none
    fn get_current_name(&self, address: u64) -> String;

    /// Assign `candidate` as the name at `address`
    fn set_name(
        &mut self,
        address: u64,
        candidate: &str,
        mode: SetNameMode,
    ) -> Result<(), SetNameError>;

    /// Attach a free-text comment to the function at `address`
    fn annotate(&mut self, address: u64, comment: &str) -> Result<(), StoreError>;
}

/// Check that `name` is an identifier: ASCII letters, digits and `_`, not starting with a digit
pub fn validate_identifier(name: &str) -> Result<(), SetNameError> {
    let mut chars = name.chars();

    match chars.next() {
        None => Err(SetNameError::Empty),
        Some(first) if first.is_ascii_digit() => {
            Err(SetNameError::InvalidIdentifier(name.to_string()))
        }
        Some(_) if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => Ok(()),
        Some(_) => Err(SetNameError::InvalidIdentifier(name.to_string())),
    }
}
