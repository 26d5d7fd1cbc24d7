//! PE binary parser implementation
//!
//! A PE image only names the functions it exports, so stripped executables usually
//! yield just the entry point.

use super::common::{
    defined_functions, BinaryFormat, BinaryFunctions, BinaryInfo, BinaryParser, Symbol, SymbolType,
};
use anyhow::{anyhow, Result};
use goblin::pe::PE;

/// PE binary parser
pub struct PeParser;

impl PeParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract architecture information from PE header
    fn get_architecture(pe: &PE) -> String {
        match pe.header.coff_header.machine {
            goblin::pe::header::COFF_MACHINE_X86_64 => "x86_64".to_string(),
            goblin::pe::header::COFF_MACHINE_X86 => "i386".to_string(),
            goblin::pe::header::COFF_MACHINE_ARM => "ARM".to_string(),
            goblin::pe::header::COFF_MACHINE_ARM64 => "ARM64".to_string(),
            goblin::pe::header::COFF_MACHINE_ARMNT => "ARM (Windows RT)".to_string(),
            _ => format!("Unknown (0x{:x})", pe.header.coff_header.machine),
        }
    }

    /// Determine if the PE is 32-bit or 64-bit
    fn get_bitness(pe: &PE) -> u8 {
        if pe.is_64 {
            64
        } else {
            32
        }
    }

    /// Exported functions, addressed by virtual address
    fn extract_exports(pe: &PE) -> Vec<Symbol> {
        let image_base = pe.image_base as u64;

        pe.exports
            .iter()
            .filter_map(|export| {
                let name = export.name.filter(|name| !name.is_empty())?;
                Some(Symbol {
                    name: name.to_string(),
                    address: (export.rva != 0).then(|| image_base + export.rva as u64),
                    is_import: false,
                    symbol_type: SymbolType::Function,
                })
            })
            .collect()
    }

    /// Extract DLL dependencies
    fn extract_dependencies(pe: &PE) -> Vec<String> {
        pe.libraries.iter().map(|lib| lib.to_string()).collect()
    }
}

impl Default for PeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryParser for PeParser {
    fn parse(&self, data: &[u8], file_path: &str) -> Result<BinaryFunctions> {
        let pe = PE::parse(data).map_err(|e| anyhow!("Failed to parse PE: {}", e))?;

        let info = BinaryInfo {
            path: file_path.to_string(),
            format: BinaryFormat::PE,
            architecture: Self::get_architecture(&pe),
            bitness: Self::get_bitness(&pe),
            entry_point: (pe.entry != 0).then(|| pe.image_base as u64 + pe.entry as u64),
            dependencies: Self::extract_dependencies(&pe),
        };

        Ok(BinaryFunctions {
            info,
            functions: defined_functions(Self::extract_exports(&pe)),
        })
    }

    fn can_parse(&self, data: &[u8]) -> bool {
        // Check for PE magic number (MZ header followed by PE signature)
        if data.len() < 64 {
            return false;
        }

        // Check MZ signature
        if &data[0..2] != b"MZ" {
            return false;
        }

        // Get PE header offset
        if let Ok(pe_offset_bytes) = data[60..64].try_into() {
            let pe_offset = u32::from_le_bytes(pe_offset_bytes) as usize;

            // Check if PE signature exists at the offset
            if pe_offset + 4 <= data.len() {
                return &data[pe_offset..pe_offset + 4] == b"PE\x00\x00";
            }
        }

        false
    }

    fn name(&self) -> &'static str {
        "PE Parser"
    }
}
