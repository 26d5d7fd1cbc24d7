//! JSON-file backed naming database
//!
//! On disk the database is a single JSON document:
//!
//! ```json
//! {
//!   "binary": "target.exe",
//!   "functions": [
//!     { "address": "0x401000", "name": "sub_401000", "comment": null }
//!   ]
//! }
//! ```
//!
//! Addresses absent from the file have no name.

use super::common::{validate_identifier, NameStore, SetNameError, SetNameMode, StoreError};
use crate::binary::{clean_symbol_name, BinaryFunctions};
use crate::matches::{format_address, parse_hex_address};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Name used for the entry point when no symbol covers it
const ENTRY_POINT_NAME: &str = "start";

/// A named function in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    /// Function start address
    #[serde(serialize_with = "serialize_address", deserialize_with = "deserialize_address")]
    pub address: u64,
    /// Assigned name (empty when unnamed)
    #[serde(default)]
    pub name: String,
    /// Function comment
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DatabaseFile {
    #[serde(default)]
    binary: Option<String>,
    #[serde(default)]
    functions: Vec<FunctionEntry>,
}

/// In-memory naming database that can be loaded from and saved to JSON
#[derive(Debug, Clone, Default)]
pub struct ProjectDatabase {
    binary: Option<String>,
    functions: BTreeMap<u64, FunctionEntry>,
    /// Reverse index used for collision checks
    addresses_by_name: HashMap<String, u64>,
}

impl ProjectDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a database from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read database '{}': {}", path.display(), e))?;

        let database = Self::from_json(&data)
            .map_err(|e| anyhow!("Failed to parse database '{}': {}", path.display(), e))?;

        info!(
            path = %path.display(),
            functions = database.len(),
            "loaded naming database"
        );
        Ok(database)
    }

    /// Parse a database from its JSON text
    pub fn from_json(data: &str) -> Result<Self> {
        let file: DatabaseFile = serde_json::from_str(data)?;

        let mut database = Self {
            binary: file.binary,
            ..Self::default()
        };
        for entry in file.functions {
            database.insert(entry);
        }

        Ok(database)
    }

    /// Build a database from the functions found in a binary
    ///
    /// Symbol names lose their version decoration. When two functions share a name only the
    /// lowest address keeps it. The entry point is named `start` if no symbol names it.
    pub fn from_binary(binary: &BinaryFunctions) -> Self {
        let mut database = Self {
            binary: Some(binary.info.path.clone()),
            ..Self::default()
        };

        let mut symbols: Vec<_> = binary
            .functions
            .iter()
            .filter_map(|symbol| symbol.address.map(|address| (address, symbol)))
            .collect();
        symbols.sort_by_key(|(address, symbol)| (*address, symbol.name.clone()));

        for (address, symbol) in symbols {
            let name = clean_symbol_name(&symbol.name);
            if name.is_empty() || database.contains(address) {
                continue;
            }
            if let Some(existing) = database.addresses_by_name.get(&name) {
                debug!(
                    name = %name,
                    address = %format_address(address),
                    existing = %format_address(*existing),
                    "duplicate symbol name, leaving function unnamed"
                );
                continue;
            }

            database.insert(FunctionEntry {
                address,
                name,
                comment: None,
            });
        }

        if let Some(entry) = binary.info.entry_point {
            if database.get_current_name(entry).is_empty()
                && !database.addresses_by_name.contains_key(ENTRY_POINT_NAME)
            {
                database.insert(FunctionEntry {
                    address: entry,
                    name: ENTRY_POINT_NAME.to_string(),
                    comment: None,
                });
            }
        }

        database
    }

    /// Serialize the database to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        let file = DatabaseFile {
            binary: self.binary.clone(),
            functions: self.functions.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Write the database to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()? + "\n")
            .map_err(|e| anyhow!("Failed to write database '{}': {}", path.display(), e))?;

        info!(
            path = %path.display(),
            functions = self.len(),
            "saved naming database"
        );
        Ok(())
    }

    /// Path of the binary this database describes, if recorded
    pub fn binary(&self) -> Option<&str> {
        self.binary.as_deref()
    }

    pub fn get(&self, address: u64) -> Option<&FunctionEntry> {
        self.functions.get(&address)
    }

    pub fn contains(&self, address: u64) -> bool {
        self.functions.contains_key(&address)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Insert or replace an entry, keeping the name index in sync
    pub fn insert(&mut self, entry: FunctionEntry) {
        if let Some(previous) = self.functions.get(&entry.address) {
            if self.addresses_by_name.get(&previous.name) == Some(&entry.address) {
                self.addresses_by_name.remove(&previous.name);
            }
        }
        if !entry.name.is_empty() {
            self.addresses_by_name
                .entry(entry.name.clone())
                .or_insert(entry.address);
        }
        self.functions.insert(entry.address, entry);
    }
}

impl NameStore for ProjectDatabase {
    fn get_current_name(&self, address: u64) -> String {
        self.functions
            .get(&address)
            .map(|entry| entry.name.clone())
            .unwrap_or_default()
    }

    fn set_name(
        &mut self,
        address: u64,
        candidate: &str,
        mode: SetNameMode,
    ) -> Result<(), SetNameError> {
        if candidate.is_empty() {
            return Err(SetNameError::Empty);
        }
        if mode == SetNameMode::Check {
            validate_identifier(candidate)?;
        }
        if let Some(&existing) = self.addresses_by_name.get(candidate) {
            if existing != address {
                return Err(SetNameError::Collision {
                    name: candidate.to_string(),
                    address: existing,
                });
            }
        }

        let comment = self.get(address).and_then(|entry| entry.comment.clone());
        self.insert(FunctionEntry {
            address,
            name: candidate.to_string(),
            comment,
        });
        Ok(())
    }

    fn annotate(&mut self, address: u64, comment: &str) -> Result<(), StoreError> {
        let entry = self
            .functions
            .get_mut(&address)
            .ok_or(StoreError::NoFunction(address))?;
        entry.comment = Some(comment.to_string());
        Ok(())
    }
}

fn serialize_address<S: Serializer>(address: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_address(*address))
}

fn deserialize_address<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_hex_address(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid address '{}'", text)))
}
