//! Binary types for binary analysis.
//!
//! `Binary` is the result of one parse: header facts plus the ordered
//! section and symbol lists. It owns every section content buffer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::section::{Section, SectionKind};
use crate::core::symbol::{Symbol, SymbolSource};
use crate::error::{ElfReadError, Result};
use crate::formats::elf::types::{ElfData, ElfType};

/// The endianness of a binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endianness {
    /// Little-endian byte order
    Little,
    /// Big-endian byte order
    Big,
}

impl From<ElfData> for Endianness {
    fn from(data: ElfData) -> Self {
        match data {
            ElfData::Little => Endianness::Little,
            ElfData::Big => Endianness::Big,
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Little => write!(f, "little"),
            Endianness::Big => write!(f, "big"),
        }
    }
}

/// Informational diagnostics raised during a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseNote {
    /// The file has no usable static symbol table
    NoStaticSymbols,
    /// The file has no usable dynamic symbol table
    NoDynamicSymbols,
    /// There is no section name string table; names are placeholders
    NoSectionNames,
}

impl fmt::Display for ParseNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseNote::NoStaticSymbols => write!(f, "No static symbol found in the file."),
            ParseNote::NoDynamicSymbols => write!(f, "No dynamic symbol found in the file."),
            ParseNote::NoSectionNames => write!(f, "No section name string table."),
        }
    }
}

/// A parsed ELF file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    pub(crate) label: String,
    pub(crate) bits: u8,
    pub(crate) byte_order: Endianness,
    pub(crate) arch: String,
    pub(crate) machine: u16,
    pub(crate) object_type: ElfType,
    pub(crate) entry: u64,
    pub(crate) sections: Vec<Section>,
    /// Static symbols first, then dynamic symbols
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) notes: Vec<ParseNote>,
}

impl Binary {
    /// Opaque source identifier supplied by the caller (path, label, ...)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 32 or 64, from the identification class byte
    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn byte_order(&self) -> Endianness {
        self.byte_order
    }

    /// Printable architecture name, "unknown" for unrecognised machines
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Raw `e_machine`
    pub fn machine(&self) -> u16 {
        self.machine
    }

    pub fn object_type(&self) -> ElfType {
        self.object_type
    }

    pub fn entry(&self) -> u64 {
        self.entry
    }

    /// Sections in section header table order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn notes(&self) -> &[ParseNote] {
        &self.notes
    }

    /// Section at `index` in file order
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Resolve a section's back-reference, confirming it belongs to this binary.
    pub fn section_of(&self, section: &Section) -> Option<&Section> {
        self.section(section.index()).filter(|s| *s == section)
    }

    /// First section with the given name
    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    /// First section whose address range holds `addr`.
    ///
    /// Non-allocated sections usually sit at address 0, so they are only
    /// matched after every other section has been tried.
    pub fn section_containing(&self, addr: u64) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.kind() != SectionKind::Other && s.contains(addr))
            .or_else(|| self.sections.iter().find(|s| s.contains(addr)))
    }

    pub fn symbol_by_name(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name() == name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.symbols.iter().filter(|s| s.is_function())
    }

    pub fn symbols_from(&self, source: SymbolSource) -> impl Iterator<Item = &Symbol> + '_ {
        self.symbols.iter().filter(move |s| s.source() == source)
    }

    /// Symbols whose value falls inside `section`'s address range
    pub fn symbols_in<'a>(&'a self, section: &'a Section) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.symbols.iter().filter(move |s| section.contains(s.value()))
    }

    /// The printable view consumed by front ends
    pub fn summary(&self) -> BinarySummary {
        BinarySummary {
            label: self.label.clone(),
            arch: self.arch.clone(),
            bits: self.bits,
            entry: self.entry,
            section_count: self.sections.len(),
            symbol_count: self.symbols.len(),
            sections: self.sections.iter().map(|s| s.name().to_string()).collect(),
            symbols: self.symbols.iter().map(|s| s.name().to_string()).collect(),
            notes: self.notes.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// JSON rendering of `summary()`
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.summary())
            .map_err(|e| ElfReadError::Serialization(e.to_string()))
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}-bit {}-endian, entry {:#x}, {} sections, {} symbols",
            self.label,
            self.arch,
            self.bits,
            self.byte_order,
            self.entry,
            self.sections.len(),
            self.symbols.len()
        )
    }
}

/// Flat, serialisable description of a parsed binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinarySummary {
    pub label: String,
    pub arch: String,
    pub bits: u8,
    pub entry: u64,
    pub section_count: usize,
    pub symbol_count: usize,
    pub sections: Vec<String>,
    pub symbols: Vec<String>,
    pub notes: Vec<String>,
}
