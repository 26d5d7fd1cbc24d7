//! Match report parsing
//!
//! A match report is a tab-separated text export from a binary diffing tool. Each data line
//! describes one function matched between two builds. Only three columns are used here:
//!
//! | index | content                                   |
//! |-------|-------------------------------------------|
//! | 3     | address in the target binary (hex)        |
//! | 4     | name the function currently has           |
//! | 6     | symbol of the matched function            |
//!
//! Blank lines and lines starting with `#` are comments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of tab-separated fields in a data line
pub const MIN_FIELDS: usize = 7;

const ADDRESS_FIELD: usize = 3;
const OLD_NAME_FIELD: usize = 4;
const NEW_NAME_FIELD: usize = 6;

/// One matched function from the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Function address in the target binary
    pub address: u64,
    /// Name recorded for the function by the diffing tool (may be empty)
    pub old_name: String,
    /// Raw symbol of the matched function
    pub raw_new_name: String,
}

/// Why a data line could not be turned into a [`MatchRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("expected at least 7 tab-separated fields, found {0}")]
    TooFewFields(usize),
    #[error("invalid hexadecimal address '{0}'")]
    InvalidAddress(String),
}

impl MatchRecord {
    /// Parse one line of a match report
    ///
    /// Returns `Ok(None)` for comment and blank lines.
    pub fn parse_line(line: &str) -> Result<Option<Self>, MalformedRecord> {
        if line.trim().is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.len() < MIN_FIELDS {
            return Err(MalformedRecord::TooFewFields(fields.len()));
        }

        let address = parse_hex_address(fields[ADDRESS_FIELD])
            .ok_or_else(|| MalformedRecord::InvalidAddress(fields[ADDRESS_FIELD].to_string()))?;

        Ok(Some(Self {
            address,
            old_name: fields[OLD_NAME_FIELD].to_string(),
            raw_new_name: fields[NEW_NAME_FIELD].to_string(),
        }))
    }

    /// Address formatted the way it appears in logs (`0x401000`)
    pub fn address_hex(&self) -> String {
        format_address(self.address)
    }
}

/// Parse a hexadecimal address, with or without a `0x` prefix
pub fn parse_hex_address(text: &str) -> Option<u64> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    u64::from_str_radix(digits, 16).ok()
}

/// Format an address as lowercase `0x`-prefixed hex
pub fn format_address(address: u64) -> String {
    format!("{:#x}", address)
}
