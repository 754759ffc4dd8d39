//! elfread: an ELF reader that decodes headers, sections and symbol tables
//! directly from raw bytes.
//!
//! ```no_run
//! use elfread::{load_elf_file, LoaderConfig};
//!
//! let bin = load_elf_file("/bin/true", &LoaderConfig::default())?;
//! println!("{} {}-bit, entry {:#x}", bin.arch(), bin.bits(), bin.entry());
//! for section in bin.sections() {
//!     println!("    {}", section.name());
//! }
//! # Ok::<(), elfread::ElfReadError>(())
//! ```

/// Output model: Binary, Section, Symbol
pub mod core;

pub mod config;
pub mod error;
pub mod formats;
pub mod io;
pub mod loader;
pub mod logging;
pub mod timeout;

pub use crate::config::{IOConfig, LoaderConfig, ParserConfig};
pub use crate::core::binary::{Binary, BinarySummary, Endianness, ParseNote};
pub use crate::core::section::{Section, SectionKind};
pub use crate::core::symbol::{Symbol, SymbolBinding, SymbolKind, SymbolSource};
pub use crate::error::{ElfReadError, Result};
pub use crate::formats::elf::types::ElfError;
pub use crate::loader::{load_elf, load_elf_file, load_elf_with_config};
