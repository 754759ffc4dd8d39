#![no_main]
use elfread::{load_elf_with_config, ParserConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(binary) = load_elf_with_config(data, "<fuzz>", &ParserConfig::any_machine()) {
        for section in binary.sections() {
            let _ = section.contains(binary.entry());
        }
        let _ = binary.summary();
    }
});
