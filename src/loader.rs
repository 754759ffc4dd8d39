//! Top-level loading: raw bytes or a file in, `Binary` out.
//!
//! A parse is all-or-nothing. Any stage error aborts and nothing partial is
//! returned. No state survives between calls.

use std::path::Path;

use tracing::{debug, info};

use crate::config::{LoaderConfig, ParserConfig};
use crate::core::binary::{Binary, Endianness, ParseNote};
use crate::error::Result;
use crate::formats::elf::{self, ElfParser};
use crate::io::SafeReader;
use crate::span_trace;

/// Parse `data` with the default configuration.
pub fn load_elf(data: &[u8], label: impl Into<String>) -> elf::Result<Binary> {
    load_elf_with_config(data, label, &ParserConfig::default())
}

/// Parse `data` into a `Binary`.
pub fn load_elf_with_config(
    data: &[u8],
    label: impl Into<String>,
    config: &ParserConfig,
) -> elf::Result<Binary> {
    let label = label.into();
    let span = span_trace!("load_elf", label = %label, size = data.len());
    let _guard = span.enter();

    let parser = ElfParser::parse(data)?;
    let header = *parser.header();
    debug!(
        class = header.class().bits(),
        endian = ?header.endian(),
        machine = header.e_machine,
        entry = header.entry_point(),
        "decoded header"
    );

    parser.check_machine(&config.supported_machines)?;

    let table = parser.sections(config.content_limits(data.len()))?;

    let mut notes = Vec::new();
    if table.count() > 0 && !table.has_names() {
        notes.push(ParseNote::NoSectionNames);
    }

    // A disabled table is not looked for, so its absence is not noted
    let mut symbols = Vec::new();
    if config.load_static_symbols {
        match parser.symbols(&table)? {
            Some(found) => symbols.extend(found),
            None => notes.push(ParseNote::NoStaticSymbols),
        }
    }
    if config.load_dynamic_symbols {
        match parser.dynamic_symbols(&table)? {
            Some(found) => symbols.extend(found),
            None => notes.push(ParseNote::NoDynamicSymbols),
        }
    }

    let binary = Binary {
        label,
        bits: parser.arch().bits,
        byte_order: Endianness::from(header.endian()),
        arch: parser.arch().name().to_string(),
        machine: header.e_machine,
        object_type: header.file_type(),
        entry: header.entry_point(),
        sections: table.into_sections(),
        symbols,
        notes,
    };
    info!(
        arch = binary.arch(),
        bits = binary.bits(),
        sections = binary.section_count(),
        symbols = binary.symbol_count(),
        "parsed ELF"
    );

    Ok(binary)
}

/// Read `path` within the configured limits and parse it.
///
/// The path's display form becomes the binary's label.
pub fn load_elf_file<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<Binary> {
    let path = path.as_ref();
    let reader = SafeReader::open(path, config.io.clone())?;
    let data = reader.read_all()?;
    Ok(load_elf_with_config(
        &data,
        path.display().to_string(),
        &config.parser,
    )?)
}
