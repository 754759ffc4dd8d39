//! Section header table loading

use crate::core::section::{Section, SectionKind};
use crate::formats::elf::cursor::{table_entry_offset, ByteCursor};
use crate::formats::elf::strtab::StringTable;
use crate::formats::elf::types::*;
use tracing::{debug, trace, warn};

/// Name given to sections when the file has no section name table
pub const NONAME: &str = "<noname>";

/// Caps on how much section content is copied out of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLimits {
    /// Largest single section
    pub max_section_size: u64,
    /// Sum over every section. Headers may alias the same file range, so
    /// this is what bounds memory relative to the input.
    pub max_total: u64,
}

impl ContentLimits {
    pub const UNLIMITED: Self = Self {
        max_section_size: u64::MAX,
        max_total: u64::MAX,
    };
}

/// Ordered section list with lookup helpers
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    sections: Vec<Section>,
    has_names: bool,
}

impl SectionTable {
    /// Walk the section header table, copy out contents, and resolve names.
    pub fn parse(data: &[u8], header: &ElfHeader, limits: ContentLimits) -> Result<Self> {
        let cursor = ByteCursor::new(data);
        let class = header.class();
        let endian = header.endian();

        if header.e_shoff == 0 {
            debug!("no section header table");
            return Ok(Self::default());
        }

        let min_entsize = class.section_header_size() as u64;
        let entsize = u64::from(header.e_shentsize);
        if entsize < min_entsize {
            return Err(ElfError::InvalidEntrySize {
                table: "section header",
                expected: min_entsize,
                found: entsize,
            });
        }

        // Section 0 must be readable before extended numbering can be consulted
        check_table_bounds(&cursor, header.e_shoff, 1, entsize)?;
        let first = parse_section_header(&cursor, header.e_shoff, class, endian)?;

        let count = if header.e_shnum == 0 {
            // Extended numbering: the real count lives in section 0
            first.sh_size
        } else {
            u64::from(header.e_shnum)
        };
        check_table_bounds(&cursor, header.e_shoff, count, entsize)?;

        let mut headers = Vec::with_capacity(count as usize);
        for i in 0..count {
            let offset = table_entry_offset(header.e_shoff, i, entsize, data.len() as u64)?;
            headers.push(parse_section_header(&cursor, offset, class, endian)?);
        }
        debug!(count, offset = header.e_shoff, "parsed section headers");

        let mut budget = limits.max_total;
        let mut sections = Vec::with_capacity(headers.len());
        for (index, sh) in headers.iter().enumerate() {
            let content = load_content(&cursor, index, sh, limits.max_section_size, &mut budget)?;
            sections.push(Section {
                index,
                name: String::new(),
                kind: SectionKind::classify(sh.sh_type, sh.sh_flags),
                vma: sh.sh_addr,
                size: sh.sh_size,
                section_type: sh.sh_type,
                flags: sh.sh_flags,
                file_offset: sh.sh_offset,
                link: sh.sh_link,
                entry_size: sh.sh_entsize,
                content,
            });
        }

        let shstrndx = if header.e_shstrndx == SHN_XINDEX {
            first.sh_link as usize
        } else {
            usize::from(header.e_shstrndx)
        };
        let has_names = resolve_names(&mut sections, &headers, shstrndx)?;

        Ok(Self {
            sections,
            has_names,
        })
    }

    /// Get section by index
    pub fn by_index(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Get the first section with `name`
    pub fn by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    /// Get the first section of type `sh_type`
    pub fn by_type(&self, sh_type: u32) -> Option<&Section> {
        self.sections.iter().find(|s| s.section_type() == sh_type)
    }

    /// String table view over the section at `index`
    pub fn string_table(&self, index: usize) -> StringTable<'_> {
        StringTable::new(index, self.by_index(index).and_then(|s| s.content()))
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn count(&self) -> usize {
        self.sections.len()
    }

    /// False when names are `NONAME` placeholders
    pub fn has_names(&self) -> bool {
        self.has_names
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }
}

fn check_table_bounds(
    cursor: &ByteCursor<'_>,
    offset: u64,
    count: u64,
    entsize: u64,
) -> Result<()> {
    let needed = count.checked_mul(entsize);
    match needed {
        Some(needed) if cursor.contains(offset, needed) => Ok(()),
        _ => Err(ElfError::TruncatedHeader {
            offset,
            needed: needed.unwrap_or(u64::MAX),
            available: cursor.len() as u64,
        }),
    }
}

/// Copy a section's file-backed bytes, or `None` when it has none.
///
/// `budget` is what remains of the total content allowance and is charged
/// for every copy.
fn load_content(
    cursor: &ByteCursor<'_>,
    index: usize,
    sh: &SectionHeader,
    max_section_size: u64,
    budget: &mut u64,
) -> Result<Option<Vec<u8>>> {
    if matches!(sh.sh_type, SHT_NOBITS | SHT_NULL) || sh.sh_size == 0 {
        return Ok(None);
    }

    if sh.sh_size > max_section_size {
        warn!(
            index,
            size = sh.sh_size,
            limit = max_section_size,
            "section exceeds size limit"
        );
        return Err(ElfError::AllocationFailure {
            index,
            size: sh.sh_size,
        });
    }

    if sh.sh_size > *budget {
        warn!(
            index,
            size = sh.sh_size,
            remaining = *budget,
            "total section content exceeds limit"
        );
        return Err(ElfError::AllocationFailure {
            index,
            size: sh.sh_size,
        });
    }

    let bytes = cursor
        .read(sh.sh_offset, sh.sh_size)
        .map_err(|_| ElfError::TruncatedSection {
            index,
            offset: sh.sh_offset,
            size: sh.sh_size,
            available: cursor.len() as u64,
        })?;

    let mut content = Vec::new();
    content
        .try_reserve_exact(bytes.len())
        .map_err(|_| ElfError::AllocationFailure {
            index,
            size: sh.sh_size,
        })?;
    content.extend_from_slice(bytes);
    *budget -= sh.sh_size;
    trace!(index, size = content.len(), "loaded section content");

    Ok(Some(content))
}

/// Fill in section names. Returns whether a name table was available.
fn resolve_names(
    sections: &mut [Section],
    headers: &[SectionHeader],
    shstrndx: usize,
) -> Result<bool> {
    if shstrndx == usize::from(SHN_UNDEF) || shstrndx >= sections.len() {
        if shstrndx != usize::from(SHN_UNDEF) {
            warn!(
                shstrndx,
                count = sections.len(),
                "section name table index out of range"
            );
        }
        for section in sections.iter_mut() {
            section.name = NONAME.to_string();
        }
        return Ok(false);
    }

    let names: Vec<String> = {
        let strtab = StringTable::new(shstrndx, sections[shstrndx].content());
        headers
            .iter()
            .map(|sh| strtab.resolve(sh.sh_name))
            .collect::<Result<_>>()?
    };
    for (section, name) in sections.iter_mut().zip(names) {
        section.name = name;
    }
    Ok(true)
}

/// Parse a single section header
fn parse_section_header(
    cursor: &ByteCursor<'_>,
    offset: u64,
    class: ElfClass,
    endian: ElfData,
) -> Result<SectionHeader> {
    match class {
        ElfClass::Elf32 => Ok(SectionHeader {
            sh_name: cursor.read_u32_at(offset, endian)?,
            sh_type: cursor.read_u32_at(offset + 4, endian)?,
            sh_flags: u64::from(cursor.read_u32_at(offset + 8, endian)?),
            sh_addr: u64::from(cursor.read_u32_at(offset + 12, endian)?),
            sh_offset: u64::from(cursor.read_u32_at(offset + 16, endian)?),
            sh_size: u64::from(cursor.read_u32_at(offset + 20, endian)?),
            sh_link: cursor.read_u32_at(offset + 24, endian)?,
            sh_info: cursor.read_u32_at(offset + 28, endian)?,
            sh_addralign: u64::from(cursor.read_u32_at(offset + 32, endian)?),
            sh_entsize: u64::from(cursor.read_u32_at(offset + 36, endian)?),
        }),
        ElfClass::Elf64 => Ok(SectionHeader {
            sh_name: cursor.read_u32_at(offset, endian)?,
            sh_type: cursor.read_u32_at(offset + 4, endian)?,
            sh_flags: cursor.read_u64_at(offset + 8, endian)?,
            sh_addr: cursor.read_u64_at(offset + 16, endian)?,
            sh_offset: cursor.read_u64_at(offset + 24, endian)?,
            sh_size: cursor.read_u64_at(offset + 32, endian)?,
            sh_link: cursor.read_u32_at(offset + 40, endian)?,
            sh_info: cursor.read_u32_at(offset + 44, endian)?,
            sh_addralign: cursor.read_u64_at(offset + 48, endian)?,
            sh_entsize: cursor.read_u64_at(offset + 56, endian)?,
        }),
    }
}
