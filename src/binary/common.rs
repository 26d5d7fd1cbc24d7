//! Common types and traits for reading functions out of binaries

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Represents a symbol found in a binary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// The name of the symbol
    pub name: String,
    /// The address of the symbol (if available)
    pub address: Option<u64>,
    /// Whether this symbol is imported from an external library
    pub is_import: bool,
    /// Symbol type (function, object, etc.)
    pub symbol_type: SymbolType,
}

/// Types of symbols found in binaries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolType {
    Function,
    Object,
    Section,
    File,
    Unknown,
}

/// Information about a binary file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryInfo {
    /// The file path of the binary
    pub path: String,
    /// The format of the binary (ELF, PE, etc.)
    pub format: BinaryFormat,
    /// The architecture of the binary
    pub architecture: String,
    /// Whether the binary is 32-bit or 64-bit
    pub bitness: u8,
    /// The entry point address (if available)
    pub entry_point: Option<u64>,
    /// List of shared libraries this binary depends on
    pub dependencies: Vec<String>,
}

/// Supported binary formats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryFormat {
    ELF,
    PE,
}

impl std::fmt::Display for BinaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryFormat::ELF => write!(f, "ELF"),
            BinaryFormat::PE => write!(f, "PE"),
        }
    }
}

/// Functions defined in a binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryFunctions {
    /// Basic information about the binary
    pub info: BinaryInfo,
    /// Defined (non-imported) function symbols with addresses
    pub functions: Vec<Symbol>,
}

/// Trait for binary parsers
pub trait BinaryParser {
    /// Parse a binary and list the functions it defines
    fn parse(&self, data: &[u8], file_path: &str) -> Result<BinaryFunctions>;

    /// Check if this parser can handle the given binary format
    fn can_parse(&self, data: &[u8]) -> bool;

    /// Get the name of this parser
    fn name(&self) -> &'static str;
}

/// Strip symbol version decorations (`memcpy@@GLIBC_2.14` → `memcpy`)
pub fn clean_symbol_name(name: &str) -> String {
    if let Some(pos) = name.find("@@") {
        name[..pos].to_string()
    } else if let Some(pos) = name.find('@') {
        name[..pos].to_string()
    } else {
        name.to_string()
    }
}

/// Keep only defined functions that have an address, ordered by address then name
pub fn defined_functions(symbols: impl IntoIterator<Item = Symbol>) -> Vec<Symbol> {
    let mut functions: Vec<Symbol> = symbols
        .into_iter()
        .filter(|sym| {
            !sym.is_import && sym.symbol_type == SymbolType::Function && sym.address.is_some()
        })
        .collect();

    functions.sort_by(|a, b| (a.address, &a.name).cmp(&(b.address, &b.name)));
    functions.dedup();
    functions
}
