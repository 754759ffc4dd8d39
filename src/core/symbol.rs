//! Symbol type for named program entities.
//!
//! Symbols come from the static (`.symtab`) and dynamic (`.dynsym`) tables.
//! They do not point at sections; correlate by address with
//! `Section::contains`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::formats::elf::types::{SymbolEntry, STB_GLOBAL, STB_LOCAL, STB_WEAK};

/// Symbol kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Function symbol (`STT_FUNC` or `STT_GNU_IFUNC`)
    Function,
    /// Other/unknown symbol type
    Other,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Function => write!(f, "Function"),
            SymbolKind::Other => write!(f, "Other"),
        }
    }
}

/// Symbol binding types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolBinding {
    Local,
    Global,
    Weak,
    Other(u8),
}

impl From<u8> for SymbolBinding {
    fn from(bind: u8) -> Self {
        match bind {
            STB_LOCAL => SymbolBinding::Local,
            STB_GLOBAL => SymbolBinding::Global,
            STB_WEAK => SymbolBinding::Weak,
            other => SymbolBinding::Other(other),
        }
    }
}

impl fmt::Display for SymbolBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolBinding::Local => write!(f, "Local"),
            SymbolBinding::Global => write!(f, "Global"),
            SymbolBinding::Weak => write!(f, "Weak"),
            SymbolBinding::Other(b) => write!(f, "Other({})", b),
        }
    }
}

/// Which table a symbol was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolSource {
    /// `SHT_SYMTAB`
    Static,
    /// `SHT_DYNSYM`
    Dynamic,
}

impl fmt::Display for SymbolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolSource::Static => write!(f, "static"),
            SymbolSource::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// A named program entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub(crate) name: String,
    pub(crate) kind: SymbolKind,
    pub(crate) value: u64,
    pub(crate) size: u64,
    pub(crate) binding: SymbolBinding,
    pub(crate) section_index: u16,
    pub(crate) source: SymbolSource,
}

impl Symbol {
    pub(crate) fn from_entry(entry: &SymbolEntry, name: String, source: SymbolSource) -> Self {
        let kind = if entry.is_function() {
            SymbolKind::Function
        } else {
            SymbolKind::Other
        };
        Self {
            name,
            kind,
            value: entry.st_value,
            size: entry.st_size,
            binding: SymbolBinding::from(entry.st_bind()),
            section_index: entry.st_shndx,
            source,
        }
    }

    /// Resolved name; empty for unnamed entries
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Value, usually the address
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn binding(&self) -> SymbolBinding {
        self.binding
    }

    /// Raw `st_shndx`
    pub fn section_index(&self) -> u16 {
        self.section_index
    }

    pub fn source(&self) -> SymbolSource {
        self.source
    }

    pub fn is_function(&self) -> bool {
        self.kind == SymbolKind::Function
    }

    pub fn is_dynamic(&self) -> bool {
        self.source == SymbolSource::Dynamic
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x} {} {}", self.value, self.kind, self.name)
    }
}
