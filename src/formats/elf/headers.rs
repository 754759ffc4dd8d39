//! ELF header parsing

use crate::formats::elf::cursor::ByteCursor;
use crate::formats::elf::types::*;

fn truncated(needed: usize, available: usize) -> ElfError {
    ElfError::TruncatedHeader {
        offset: 0,
        needed: needed as u64,
        available: available as u64,
    }
}

/// Parse ELF identification bytes
pub fn parse_ident(data: &[u8]) -> Result<ElfIdent> {
    // Short input is only a truncated ELF if what is there matches the magic
    let prefix = &data[..data.len().min(ELF_MAGIC.len())];
    if prefix != &ELF_MAGIC[..prefix.len()] {
        return Err(ElfError::InvalidMagic {
            found: prefix.to_vec(),
        });
    }

    if data.len() < EI_NIDENT {
        return Err(truncated(EI_NIDENT, data.len()));
    }

    let class = ElfClass::from_u8(data[EI_CLASS])?;
    let data_encoding = ElfData::from_u8(data[EI_DATA])?;

    Ok(ElfIdent {
        class,
        data: data_encoding,
        version: data[EI_VERSION],
        osabi: data[EI_OSABI],
    })
}

/// Parse ELF header
///
/// Only the fields needed to walk sections and symbols are kept; program
/// header fields are skipped.
pub fn parse_header(data: &[u8]) -> Result<ElfHeader> {
    let ident = parse_ident(data)?;
    let class = ident.class;

    let header_size = class.header_size();
    if data.len() < header_size {
        return Err(truncated(header_size, data.len()));
    }

    let cursor = ByteCursor::new(data);
    let endian = ident.data;
    let word = class.word_size() as u64;

    let e_type = cursor.read_u16_at(16, endian)?;
    let e_machine = cursor.read_u16_at(18, endian)?;
    let e_version = cursor.read_u32_at(20, endian)?;
    let e_entry = cursor.read_word_at(24, class, endian)?;
    // e_phoff sits between e_entry and e_shoff
    let e_shoff = cursor.read_word_at(24 + 2 * word, class, endian)?;
    let tail = 24 + 3 * word;
    let e_flags = cursor.read_u32_at(tail, endian)?;
    // e_ehsize, e_phentsize, e_phnum occupy tail+4..tail+10
    let e_shentsize = cursor.read_u16_at(tail + 10, endian)?;
    let e_shnum = cursor.read_u16_at(tail + 12, endian)?;
    let e_shstrndx = cursor.read_u16_at(tail + 14, endian)?;

    Ok(ElfHeader {
        ident,
        e_type,
        e_machine,
        e_version,
        e_entry,
        e_shoff,
        e_flags,
        e_shentsize,
        e_shnum,
        e_shstrndx,
    })
}
