//! Section type for file-format organizational units.
//!
//! A `Section` is one entry of the ELF section header table together with
//! an owned copy of its file-backed content.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::formats::elf::types::{SHF_ALLOC, SHF_EXECINSTR, SHT_NOBITS};

/// Coarse classification of a section from its type and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    /// Holds executable instructions
    Code,
    /// Allocated, file-backed, non-executable contents
    Data,
    /// Everything else (string tables, symbol tables, debug info, ...)
    Other,
}

impl SectionKind {
    /// `SHF_EXECINSTR` is code. Data must be loaded into memory and occupy
    /// file space, so `SHT_NOBITS` and non-`SHF_ALLOC` sections are other.
    pub fn classify(sh_type: u32, flags: u64) -> Self {
        if flags & SHF_EXECINSTR != 0 {
            SectionKind::Code
        } else if flags & SHF_ALLOC != 0 && sh_type != SHT_NOBITS {
            SectionKind::Data
        } else {
            SectionKind::Other
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Code => write!(f, "code"),
            SectionKind::Data => write!(f, "data"),
            SectionKind::Other => write!(f, "other"),
        }
    }
}

/// File-format organizational unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Position in the section header table; doubles as the link back to
    /// the owning `Binary` (see `Binary::section_of`)
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) kind: SectionKind,
    pub(crate) vma: u64,
    pub(crate) size: u64,
    pub(crate) section_type: u32,
    pub(crate) flags: u64,
    pub(crate) file_offset: u64,
    pub(crate) link: u32,
    pub(crate) entry_size: u64,
    /// Exactly `size` bytes, or `None` when the section has no file backing
    pub(crate) content: Option<Vec<u8>>,
}

impl Section {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// Virtual memory address
    pub fn vma(&self) -> u64 {
        self.vma
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Raw `sh_type`
    pub fn section_type(&self) -> u32 {
        self.section_type
    }

    /// Raw `sh_flags`
    pub fn flags(&self) -> u64 {
        self.flags
    }

    pub fn file_offset(&self) -> u64 {
        self.file_offset
    }

    /// Raw `sh_link`
    pub fn link(&self) -> u32 {
        self.link
    }

    pub fn entry_size(&self) -> u64 {
        self.entry_size
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn is_nobits(&self) -> bool {
        self.section_type == SHT_NOBITS
    }

    pub fn is_code(&self) -> bool {
        self.kind == SectionKind::Code
    }

    pub fn is_data(&self) -> bool {
        self.kind == SectionKind::Data
    }

    /// Whether `addr` falls in `[vma, vma + size)`.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.vma && addr - self.vma < self.size
    }

    /// End of the address range, saturating at `u64::MAX`
    pub fn end(&self) -> u64 {
        self.vma.saturating_add(self.size)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:2}] {} ({}) {:#x}+{:#x}",
            self.index, self.name, self.kind, self.vma, self.size
        )
    }
}

#[cfg(test)]
pub(crate) fn test_section(index: usize, name: &str, vma: u64, size: u64, flags: u64) -> Section {
    let section_type = crate::formats::elf::types::SHT_PROGBITS;
    Section {
        index,
        name: name.to_string(),
        kind: SectionKind::classify(section_type, flags),
        vma,
        size,
        section_type,
        flags,
        file_offset: 0,
        link: 0,
        entry_size: 0,
        content: Some(vec![0; size as usize]),
    }
}
