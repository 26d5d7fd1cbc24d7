//! Binary reading module
//!
//! Lists the functions a target binary names in its symbol or export tables so that a
//! naming database can be seeded from them. The format is detected automatically.

use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

pub mod common;
pub mod elf;
pub mod pe;

pub use common::{
    clean_symbol_name, BinaryFormat, BinaryFunctions, BinaryInfo, BinaryParser, Symbol,
    SymbolType,
};
pub use elf::ElfParser;
pub use pe::PeParser;

/// Binary reader that can handle multiple formats
pub struct BinaryAnalyzer {
    parsers: Vec<Box<dyn BinaryParser>>,
}

impl BinaryAnalyzer {
    /// Create a new binary analyzer with all supported parsers
    pub fn new() -> Self {
        let parsers: Vec<Box<dyn BinaryParser>> =
            vec![Box::new(ElfParser::new()), Box::new(PeParser::new())];

        Self { parsers }
    }

    /// List the functions of a binary file
    pub fn analyze_file<P: AsRef<Path>>(&self, file_path: P) -> Result<BinaryFunctions> {
        let path = file_path.as_ref();
        let data = fs::read(path)
            .map_err(|e| anyhow!("Failed to read file '{}': {}", path.display(), e))?;

        self.analyze_data(&data, &path.to_string_lossy())
    }

    /// List the functions of in-memory binary data
    pub fn analyze_data(&self, data: &[u8], file_path: &str) -> Result<BinaryFunctions> {
        let parser = self
            .parsers
            .iter()
            .find(|parser| parser.can_parse(data))
            .ok_or_else(|| {
                anyhow!(
                    "Unsupported binary format. Supported formats: {}",
                    self.supported_formats().join(", ")
                )
            })?;

        debug!(parser = parser.name(), path = file_path, "parsing binary");
        parser.parse(data, file_path)
    }

    /// Get information about supported binary formats
    pub fn supported_formats(&self) -> Vec<String> {
        self.parsers.iter().map(|p| p.name().to_string()).collect()
    }
}

impl Default for BinaryAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
