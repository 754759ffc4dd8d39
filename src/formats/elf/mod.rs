//! ELF (Executable and Linkable Format) parser
//!
//! Decodes headers, sections and symbol tables straight from raw bytes.
//! Stages run strictly in order: header, architecture, sections, symbols.

pub mod arch;
pub mod cursor;
pub mod headers;
pub mod sections;
pub mod strtab;
pub mod symbols;
pub mod types;

use arch::ArchInfo;
use headers::parse_header;
use sections::{ContentLimits, SectionTable};
use symbols::{load_symbols, SymbolTableKind};
pub use types::*;

use crate::core::symbol::Symbol;

/// Main ELF parser
pub struct ElfParser<'data> {
    data: &'data [u8],
    header: ElfHeader,
    arch: ArchInfo,
}

impl<'data> ElfParser<'data> {
    /// Decode the header and classify the machine
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let header = parse_header(data)?;
        let arch = arch::classify(&header);

        Ok(Self { data, header, arch })
    }

    /// Get ELF header
    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    pub fn arch(&self) -> &ArchInfo {
        &self.arch
    }

    /// Get raw data
    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    /// Fail unless the machine is in `supported` (empty accepts all)
    pub fn check_machine(&self, supported: &[u16]) -> Result<()> {
        arch::check_supported(&self.arch, supported)
    }

    /// Get sections, copying out content within `limits`
    pub fn sections(&self, limits: ContentLimits) -> Result<SectionTable> {
        SectionTable::parse(self.data, &self.header, limits)
    }

    /// Get the static symbol table
    pub fn symbols(&self, sections: &SectionTable) -> Result<Option<Vec<Symbol>>> {
        self.symbol_table(sections, SymbolTableKind::STATIC)
    }

    /// Get the dynamic symbol table
    pub fn dynamic_symbols(&self, sections: &SectionTable) -> Result<Option<Vec<Symbol>>> {
        self.symbol_table(sections, SymbolTableKind::DYNAMIC)
    }

    fn symbol_table(
        &self,
        sections: &SectionTable,
        kind: SymbolTableKind,
    ) -> Result<Option<Vec<Symbol>>> {
        load_symbols(sections, kind, self.header.class(), self.header.endian())
    }
}
