//! Configuration for the ELF loader.
//!
//! Provides centralized configuration for parsing and file reading with
//! sensible defaults. Every struct can be read from JSON.

use serde::{Deserialize, Serialize};

use crate::error::{ElfReadError, Result};
use crate::formats::elf::sections::ContentLimits;
use crate::formats::elf::types::{EM_386, EM_X86_64};

/// Default total content allowance, as a multiple of the input length
pub const CONTENT_INPUT_RATIO: u64 = 2;

/// Master configuration for loading a binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// I/O configuration for file reading.
    pub io: IOConfig,
}

impl LoaderConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ElfReadError::Serialization(e.to_string()))
    }
}

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Accepted `e_machine` values; empty accepts every machine.
    pub supported_machines: Vec<u16>,
    /// Largest file-backed section content that will be copied out.
    pub max_section_size: u64,
    /// Cap on all copied section content combined. `None` allows
    /// `CONTENT_INPUT_RATIO` times the input length.
    pub max_total_content: Option<u64>,
    /// Read `.symtab`.
    pub load_static_symbols: bool,
    /// Read `.dynsym`.
    pub load_dynamic_symbols: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            supported_machines: vec![EM_386, EM_X86_64],
            max_section_size: 256 * 1024 * 1024, // 256MB
            max_total_content: None,
            load_static_symbols: true,
            load_dynamic_symbols: true,
        }
    }
}

impl ParserConfig {
    /// A configuration that accepts any machine code.
    pub fn any_machine() -> Self {
        Self {
            supported_machines: Vec::new(),
            ..Self::default()
        }
    }

    /// Content limits for an input of `input_len` bytes.
    pub fn content_limits(&self, input_len: usize) -> ContentLimits {
        let max_total = self
            .max_total_content
            .unwrap_or_else(|| (input_len as u64).saturating_mul(CONTENT_INPUT_RATIO));
        ContentLimits {
            max_section_size: self.max_section_size,
            max_total,
        }
    }
}

/// I/O configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Maximum file size to accept.
    pub max_file_size: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024, // 100MB
        }
    }
}
