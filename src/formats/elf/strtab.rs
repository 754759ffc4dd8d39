//! String table resolution

use crate::formats::elf::types::{ElfError, Result};
use memchr::memchr;
use tracing::warn;

/// A string table section, identified by its section index.
///
/// `data` is `None` when the section had no loaded content (no file backing,
/// zero size, or an index that does not name a section).
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    index: usize,
    data: Option<&'a [u8]>,
}

impl<'a> StringTable<'a> {
    pub fn new(index: usize, data: Option<&'a [u8]>) -> Self {
        Self { index, data }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Resolve the name starting at `offset`.
    ///
    /// A run that reaches the end of the table without a NUL is returned as
    /// is. Offsets past the end of the table are `OutOfBounds`.
    pub fn resolve(&self, offset: u32) -> Result<String> {
        let data = self
            .data
            .ok_or(ElfError::UnterminatedString { index: self.index })?;
        let bytes = read_cstring(data, offset as usize).ok_or(ElfError::OutOfBounds {
            offset: u64::from(offset),
            length: 1,
            size: data.len() as u64,
        })?;
        if bytes.len() == data.len() - offset as usize && !bytes.is_empty() {
            warn!(
                table = self.index,
                offset, "string runs to end of table without a terminator"
            );
        }
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Bytes from `offset` up to the first NUL or the end of `data`.
///
/// `None` only if `offset` lies past the end. An offset equal to the length
/// yields an empty name.
pub fn read_cstring(data: &[u8], offset: usize) -> Option<&[u8]> {
    let slice = data.get(offset..)?;
    let end = memchr(0, slice).unwrap_or(slice.len());
    Some(&slice[..end])
}
