//! Symbol table parsing

use crate::core::section::Section;
use crate::core::symbol::{Symbol, SymbolSource};
use crate::formats::elf::cursor::ByteCursor;
use crate::formats::elf::sections::SectionTable;
use crate::formats::elf::strtab::StringTable;
use crate::formats::elf::types::*;
use tracing::{debug, info, warn};

/// Where a symbol table and its strings are expected to live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolTableKind {
    pub source: SymbolSource,
    pub sh_type: u32,
    pub name: &'static str,
    pub strtab_name: &'static str,
}

impl SymbolTableKind {
    pub const STATIC: Self = Self {
        source: SymbolSource::Static,
        sh_type: SHT_SYMTAB,
        name: ".symtab",
        strtab_name: ".strtab",
    };

    pub const DYNAMIC: Self = Self {
        source: SymbolSource::Dynamic,
        sh_type: SHT_DYNSYM,
        name: ".dynsym",
        strtab_name: ".dynstr",
    };
}

/// Locate the table for `kind`: by section type first, then by name.
pub fn find_symbol_section<'a>(
    sections: &'a SectionTable,
    kind: SymbolTableKind,
) -> Option<&'a Section> {
    sections
        .by_type(kind.sh_type)
        .or_else(|| sections.by_name(kind.name))
}

/// The string table linked from `symtab`, falling back to the canonical name.
fn linked_strings<'a>(
    sections: &'a SectionTable,
    symtab: &Section,
    kind: SymbolTableKind,
) -> StringTable<'a> {
    let link = symtab.link() as usize;
    if link != 0 && link < sections.count() {
        return sections.string_table(link);
    }

    warn!(
        table = symtab.index(),
        link,
        fallback = kind.strtab_name,
        "symbol table link out of range"
    );
    match sections.by_name(kind.strtab_name) {
        Some(strtab) => sections.string_table(strtab.index()),
        None => StringTable::new(link, None),
    }
}

/// Load one symbol table, skipping the reserved entry 0.
///
/// `Ok(None)` means the table is absent (or has no content), which is not
/// an error.
pub fn load_symbols(
    sections: &SectionTable,
    kind: SymbolTableKind,
    class: ElfClass,
    endian: ElfData,
) -> Result<Option<Vec<Symbol>>> {
    let symtab = match find_symbol_section(sections, kind) {
        Some(s) => s,
        None => {
            info!(table = kind.name, "no {} symbol table", kind.source);
            return Ok(None);
        }
    };
    let data = match symtab.content() {
        Some(d) => d,
        None => {
            info!(table = kind.name, "{} symbol table has no content", kind.source);
            return Ok(None);
        }
    };

    let entry_size = symbol_entry_size(symtab, class)?;
    let strings = linked_strings(sections, symtab, kind);
    let cursor = ByteCursor::new(data);

    let count = data.len() as u64 / entry_size;
    if data.len() as u64 % entry_size != 0 {
        warn!(
            table = symtab.index(),
            size = data.len(),
            entry_size,
            "symbol table size is not a multiple of its entry size"
        );
    }

    // Entry 0 is the reserved undefined symbol (STN_UNDEF)
    let mut symbols = Vec::with_capacity(count.saturating_sub(1) as usize);
    for i in 1..count {
        let entry = parse_symbol(&cursor, i * entry_size, class, endian)?;
        let name = if entry.st_name == 0 {
            String::new()
        } else {
            strings.resolve(entry.st_name)?
        };
        symbols.push(Symbol::from_entry(&entry, name, kind.source));
    }
    debug!(
        table = kind.name,
        count = symbols.len(),
        strtab = strings.index(),
        "parsed symbol table"
    );

    Ok(Some(symbols))
}

fn symbol_entry_size(symtab: &Section, class: ElfClass) -> Result<u64> {
    let min = class.symbol_size() as u64;
    match symtab.entry_size() {
        0 => Ok(min),
        size if size < min => Err(ElfError::InvalidEntrySize {
            table: "symbol",
            expected: min,
            found: size,
        }),
        size => Ok(size),
    }
}

/// Parse a single symbol entry
fn parse_symbol(
    cursor: &ByteCursor<'_>,
    offset: u64,
    class: ElfClass,
    endian: ElfData,
) -> Result<SymbolEntry> {
    match class {
        ElfClass::Elf32 => Ok(SymbolEntry {
            st_name: cursor.read_u32_at(offset, endian)?,
            st_value: u64::from(cursor.read_u32_at(offset + 4, endian)?),
            st_size: u64::from(cursor.read_u32_at(offset + 8, endian)?),
            st_info: cursor.read_u8_at(offset + 12)?,
            st_other: cursor.read_u8_at(offset + 13)?,
            st_shndx: cursor.read_u16_at(offset + 14, endian)?,
        }),
        ElfClass::Elf64 => Ok(SymbolEntry {
            st_name: cursor.read_u32_at(offset, endian)?,
            st_info: cursor.read_u8_at(offset + 4)?,
            st_other: cursor.read_u8_at(offset + 5)?,
            st_shndx: cursor.read_u16_at(offset + 6, endian)?,
            st_value: cursor.read_u64_at(offset + 8, endian)?,
            st_size: cursor.read_u64_at(offset + 16, endian)?,
        }),
    }
}
