//! Error types for the elfread crate.
//!
//! Format errors live in `formats::elf::types::ElfError`; this module wraps
//! them together with the I/O and timeout failures of the surrounding
//! loader.

use thiserror::Error;

use crate::formats::elf::types::ElfError;
use crate::io::error::IoError;

/// Main error type for elfread operations.
#[derive(Debug, Error)]
pub enum ElfReadError {
    /// The buffer is not a readable ELF file
    #[error(transparent)]
    Elf(#[from] ElfError),

    /// Reading the input file failed
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Parsing did not finish in time
    #[error("Parse timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ElfReadError {
    /// The underlying format error, if this is one
    pub fn as_elf(&self) -> Option<&ElfError> {
        match self {
            ElfReadError::Elf(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for elfread operations
pub type Result<T> = std::result::Result<T, ElfReadError>;
