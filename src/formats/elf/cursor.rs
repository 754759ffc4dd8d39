//! Bounds-checked access into the raw ELF buffer

use crate::formats::elf::types::{ElfClass, ElfData, ElfError, Result};

/// Read-only view over the input with endian-aware decoding.
///
/// Every read validates `offset + length` against the buffer before
/// touching it; nothing here can index out of range.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'data> {
    data: &'data [u8],
}

impl<'data> ByteCursor<'data> {
    pub fn new(data: &'data [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &'data [u8] {
        self.data
    }

    /// Borrow `length` bytes starting at `offset`.
    pub fn read(&self, offset: u64, length: u64) -> Result<&'data [u8]> {
        let oob = || ElfError::OutOfBounds {
            offset,
            length,
            size: self.data.len() as u64,
        };
        let end = offset.checked_add(length).ok_or_else(oob)?;
        if end > self.data.len() as u64 {
            return Err(oob());
        }
        // Both bounds fit in usize because they are <= data.len().
        Ok(&self.data[offset as usize..end as usize])
    }

    /// True when `[offset, offset + length)` lies inside the buffer.
    pub fn contains(&self, offset: u64, length: u64) -> bool {
        offset
            .checked_add(length)
            .is_some_and(|end| end <= self.data.len() as u64)
    }

    fn read_array<const N: usize>(&self, offset: u64) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(offset, N as u64)?);
        Ok(out)
    }

    pub fn read_u8_at(&self, offset: u64) -> Result<u8> {
        Ok(self.read_array::<1>(offset)?[0])
    }

    pub fn read_u16_at(&self, offset: u64, endian: ElfData) -> Result<u16> {
        let bytes = self.read_array(offset)?;
        Ok(match endian {
            ElfData::Little => u16::from_le_bytes(bytes),
            ElfData::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_u32_at(&self, offset: u64, endian: ElfData) -> Result<u32> {
        let bytes = self.read_array(offset)?;
        Ok(match endian {
            ElfData::Little => u32::from_le_bytes(bytes),
            ElfData::Big => u32::from_be_bytes(bytes),
        })
    }

    pub fn read_u64_at(&self, offset: u64, endian: ElfData) -> Result<u64> {
        let bytes = self.read_array(offset)?;
        Ok(match endian {
            ElfData::Little => u64::from_le_bytes(bytes),
            ElfData::Big => u64::from_be_bytes(bytes),
        })
    }

    /// Read an address/offset-sized word based on ELF class
    pub fn read_word_at(&self, offset: u64, class: ElfClass, endian: ElfData) -> Result<u64> {
        match class {
            ElfClass::Elf32 => self.read_u32_at(offset, endian).map(u64::from),
            ElfClass::Elf64 => self.read_u64_at(offset, endian),
        }
    }
}

/// Offset of entry `index` in a table of `entry_size`-byte records at `base`.
pub fn table_entry_offset(base: u64, index: u64, entry_size: u64, size: u64) -> Result<u64> {
    index
        .checked_mul(entry_size)
        .and_then(|rel| base.checked_add(rel))
        .ok_or(ElfError::OutOfBounds {
            offset: base,
            length: entry_size,
            size,
        })
}
