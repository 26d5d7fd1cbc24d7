//! ELF binary parser implementation

use super::common::{
    defined_functions, BinaryFormat, BinaryFunctions, BinaryInfo, BinaryParser, Symbol, SymbolType,
};
use anyhow::{anyhow, Result};
use goblin::elf::sym::Sym;
use goblin::elf::Elf;
use goblin::strtab::Strtab;

/// ELF binary parser
pub struct ElfParser;

impl ElfParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract architecture information from ELF header
    fn get_architecture(elf: &Elf) -> String {
        match elf.header.e_machine {
            goblin::elf::header::EM_X86_64 => "x86_64".to_string(),
            goblin::elf::header::EM_386 => "i386".to_string(),
            goblin::elf::header::EM_ARM => "ARM".to_string(),
            goblin::elf::header::EM_AARCH64 => "AArch64".to_string(),
            goblin::elf::header::EM_RISCV => "RISC-V".to_string(),
            goblin::elf::header::EM_PPC => "PowerPC".to_string(),
            goblin::elf::header::EM_PPC64 => "PowerPC64".to_string(),
            goblin::elf::header::EM_MIPS => "MIPS".to_string(),
            _ => format!("Unknown ({})", elf.header.e_machine),
        }
    }

    /// Determine if the ELF is 32-bit or 64-bit
    fn get_bitness(elf: &Elf) -> u8 {
        match elf.header.e_ident[goblin::elf::header::EI_CLASS] {
            goblin::elf::header::ELFCLASS32 => 32,
            goblin::elf::header::ELFCLASS64 => 64,
            _ => 0,
        }
    }

    /// Convert goblin symbol type to our SymbolType
    fn convert_symbol_type(st_type: u8) -> SymbolType {
        match st_type {
            goblin::elf::sym::STT_FUNC => SymbolType::Function,
            goblin::elf::sym::STT_OBJECT => SymbolType::Object,
            goblin::elf::sym::STT_SECTION => SymbolType::Section,
            goblin::elf::sym::STT_FILE => SymbolType::File,
            _ => SymbolType::Unknown,
        }
    }

    fn convert_symbol(sym: &Sym, strtab: &Strtab) -> Option<Symbol> {
        let name = strtab.get_at(sym.st_name).filter(|name| !name.is_empty())?;

        Some(Symbol {
            name: name.to_string(),
            address: (sym.st_value != 0).then_some(sym.st_value),
            is_import: sym.st_shndx == goblin::elf::section_header::SHN_UNDEF as usize,
            symbol_type: Self::convert_symbol_type(sym.st_type()),
        })
    }

    /// Extract symbols from the dynamic and regular symbol tables
    fn extract_symbols(elf: &Elf) -> Vec<Symbol> {
        let dynamic = elf
            .dynsyms
            .iter()
            .filter_map(|sym| Self::convert_symbol(&sym, &elf.dynstrtab));
        let regular = elf
            .syms
            .iter()
            .filter_map(|sym| Self::convert_symbol(&sym, &elf.strtab));

        dynamic.chain(regular).collect()
    }

    /// Extract shared library dependencies
    fn extract_dependencies(elf: &Elf) -> Vec<String> {
        elf.libraries.iter().map(|lib| lib.to_string()).collect()
    }
}

impl Default for ElfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryParser for ElfParser {
    fn parse(&self, data: &[u8], file_path: &str) -> Result<BinaryFunctions> {
        let elf = Elf::parse(data).map_err(|e| anyhow!("Failed to parse ELF: {}", e))?;

        let info = BinaryInfo {
            path: file_path.to_string(),
            format: BinaryFormat::ELF,
            architecture: Self::get_architecture(&elf),
            bitness: Self::get_bitness(&elf),
            entry_point: (elf.header.e_entry != 0).then_some(elf.header.e_entry),
            dependencies: Self::extract_dependencies(&elf),
        };

        Ok(BinaryFunctions {
            info,
            functions: defined_functions(Self::extract_symbols(&elf)),
        })
    }

    fn can_parse(&self, data: &[u8]) -> bool {
        // Check for ELF magic number
        data.len() >= 4 && &data[0..4] == b"\x7fELF"
    }

    fn name(&self) -> &'static str {
        "ELF Parser"
    }
}
