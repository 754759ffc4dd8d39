//! Machine code classification

use crate::formats::elf::types::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name reported for machine codes outside the known table
pub const UNKNOWN_ARCH: &str = "unknown";

/// ELF machine architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElfMachine {
    None,
    Sparc,
    X86,
    M68k,
    Mips,
    PowerPC,
    PowerPC64,
    S390,
    ARM,
    SparcV9,
    Ia64,
    X86_64,
    AArch64,
    RiscV,
    LoongArch,
    Other(u16),
}

impl From<u16> for ElfMachine {
    fn from(val: u16) -> Self {
        match val {
            EM_NONE => ElfMachine::None,
            EM_SPARC => ElfMachine::Sparc,
            EM_386 => ElfMachine::X86,
            EM_68K => ElfMachine::M68k,
            EM_MIPS => ElfMachine::Mips,
            EM_PPC => ElfMachine::PowerPC,
            EM_PPC64 => ElfMachine::PowerPC64,
            EM_S390 => ElfMachine::S390,
            EM_ARM => ElfMachine::ARM,
            EM_SPARCV9 => ElfMachine::SparcV9,
            EM_IA_64 => ElfMachine::Ia64,
            EM_X86_64 => ElfMachine::X86_64,
            EM_AARCH64 => ElfMachine::AArch64,
            EM_RISCV => ElfMachine::RiscV,
            EM_LOONGARCH => ElfMachine::LoongArch,
            other => ElfMachine::Other(other),
        }
    }
}

impl ElfMachine {
    /// Canonical printable architecture name
    pub fn name(&self) -> &'static str {
        match self {
            ElfMachine::None => "none",
            ElfMachine::Sparc => "sparc",
            ElfMachine::X86 => "i386",
            ElfMachine::M68k => "m68k",
            ElfMachine::Mips => "mips",
            ElfMachine::PowerPC => "powerpc",
            ElfMachine::PowerPC64 => "powerpc64",
            ElfMachine::S390 => "s390",
            ElfMachine::ARM => "arm",
            ElfMachine::SparcV9 => "sparc-v9",
            ElfMachine::Ia64 => "ia64",
            ElfMachine::X86_64 => "x86-64",
            ElfMachine::AArch64 => "aarch64",
            ElfMachine::RiscV => "riscv",
            ElfMachine::LoongArch => "loongarch",
            ElfMachine::Other(_) => UNKNOWN_ARCH,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ElfMachine::Other(_))
    }
}

impl fmt::Display for ElfMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Architecture facts derived from a decoded header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchInfo {
    pub machine: ElfMachine,
    pub machine_code: u16,
    /// Taken from the class byte, never from the machine code
    pub bits: u8,
}

impl ArchInfo {
    pub fn name(&self) -> &'static str {
        self.machine.name()
    }
}

/// Classify the header's machine field. Never fails.
pub fn classify(header: &ElfHeader) -> ArchInfo {
    ArchInfo {
        machine: ElfMachine::from(header.e_machine),
        machine_code: header.e_machine,
        bits: header.class().bits(),
    }
}

/// Reject machines outside `supported`. An empty list accepts everything.
pub fn check_supported(info: &ArchInfo, supported: &[u16]) -> Result<()> {
    if supported.is_empty() || supported.contains(&info.machine_code) {
        Ok(())
    } else {
        Err(ElfError::UnsupportedMachine {
            machine: info.machine_code,
            name: info.name(),
        })
    }
}
