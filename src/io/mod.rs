//! Bounded file reading.
//!
//! The parser works on one contiguous buffer. `SafeReader` produces that
//! buffer from a path, refusing files larger than the configured limit.

pub mod error;

use crate::config::IOConfig;
use crate::io::error::{IoError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// A bounded file reader backed by a read-only memory map.
pub struct SafeReader {
    path: PathBuf,
    // None when the file size is zero; memmap cannot map empty files.
    mmap: Option<Mmap>,
    file_size: u64,
}

impl SafeReader {
    /// Opens and maps a file, failing if it exceeds `config.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, config: IOConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            max_file_size = config.max_file_size,
            "Opening file for reading"
        );

        if file_size > config.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = config.max_file_size,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: config.max_file_size,
                found: file_size,
            });
        }

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: read-only map of a regular file; the bytes are copied
            // out before the map is dropped.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            file_size,
        })
    }

    /// Returns the total size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.file_size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy exactly `len` bytes starting at `offset`.
    pub fn read_at(&self, offset: u64, len: u64) -> Result<Bytes> {
        if len == 0 {
            return Ok(Bytes::new());
        }
        let short = IoError::ShortRead {
            offset,
            len,
            size: self.file_size,
        };
        let map = match &self.mmap {
            Some(m) => m,
            None => return Err(short),
        };
        let end = match offset.checked_add(len) {
            Some(end) if end <= map.len() as u64 => end,
            _ => return Err(short),
        };

        let out = Bytes::copy_from_slice(&map[offset as usize..end as usize]);
        trace!(
            path = %self.path.display(),
            offset,
            len,
            "Performed read"
        );
        Ok(out)
    }

    /// The whole file as one owned buffer.
    pub fn read_all(&self) -> Result<Bytes> {
        self.read_at(0, self.file_size)
    }
}
