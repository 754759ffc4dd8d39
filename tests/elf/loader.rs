use std::io::Write;

use elfread::io::error::IoError;
use elfread::timeout::{load_elf_with_timeout, TimeoutConfig};
use elfread::{load_elf_file, ElfError, ElfReadError, IOConfig, LoaderConfig, ParserConfig};
use tempfile::NamedTempFile;

use crate::common::*;

fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(data).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

#[test]
fn load_from_file_uses_path_as_label() {
    elfread::logging::init_tracing();
    let file = write_temp(&minimal_elf64());
    let bin = load_elf_file(file.path(), &LoaderConfig::default()).expect("load file");

    assert_eq!(bin.label(), file.path().display().to_string());
    assert_eq!(bin.bits(), 64);
    assert!(bin.symbol_by_name("main").is_some());
}

#[test]
fn file_over_size_limit_is_rejected() {
    let data = minimal_elf64();
    let file = write_temp(&data);
    let config = LoaderConfig {
        io: IOConfig { max_file_size: 64 },
        ..LoaderConfig::default()
    };

    match load_elf_file(file.path(), &config) {
        Err(ElfReadError::Io(IoError::FileTooLarge { limit, found })) => {
            assert_eq!(limit, 64);
            assert_eq!(found, data.len() as u64);
        }
        other => panic!("expected FileTooLarge, got {:?}", other.map(|b| b.to_string())),
    }
}

#[test]
fn empty_and_missing_files() {
    let file = write_temp(&[]);
    let err = load_elf_file(file.path(), &LoaderConfig::default()).unwrap_err();
    assert!(matches!(
        err.as_elf(),
        Some(ElfError::TruncatedHeader { available: 0, .. })
    ));

    let err = load_elf_file("/nonexistent/elfread/input", &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, ElfReadError::Io(IoError::StdIo(_))));
}

#[test]
fn parse_errors_surface_through_file_loader() {
    let mut data = minimal_elf64();
    data[0] = 0;
    let file = write_temp(&data);
    let err = load_elf_file(file.path(), &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, ElfReadError::Elf(ElfError::InvalidMagic { .. })));
    assert!(err.to_string().contains("magic"));
}

#[test]
fn json_config_drives_loading() {
    let mut builder = ElfBuilder::elf64_le().machine(183);
    let text = builder.code(".text", 0x1000, &[0; 8]);
    builder.symbols(SymbolTable::Static, &[Sym::func("start", 0x1000, 8, text)]);
    builder.symbols(SymbolTable::Dynamic, &[Sym::func("ext", 0, 0, 0)]);
    let file = write_temp(&builder.build());

    let config = LoaderConfig::from_json(
        r#"{
            "parser": { "supported_machines": [183], "load_dynamic_symbols": false },
            "io": { "max_file_size": 1048576 }
        }"#,
    )
    .unwrap();
    let bin = load_elf_file(file.path(), &config).unwrap();

    assert_eq!(bin.arch(), "aarch64");
    let names: Vec<&str> = bin.symbols().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["start"]);
}

#[test]
fn config_round_trips_through_json() {
    let config = LoaderConfig {
        parser: ParserConfig::any_machine(),
        io: IOConfig { max_file_size: 4096 },
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(LoaderConfig::from_json(&json).unwrap(), config);
}

#[tokio::test]
async fn timeout_wrapper_returns_binary() {
    let bin = load_elf_with_timeout(
        minimal_elf64(),
        "async".to_string(),
        ParserConfig::default(),
        TimeoutConfig::default_timeout("parse"),
    )
    .await
    .unwrap();
    assert_eq!(bin.label(), "async");
    assert_eq!(bin.section_count(), 7);
}
