//! Common test utilities and helpers.
//!
//! `ElfBuilder` assembles small, well-formed ELF files in memory so the
//! integration tests need no sample binaries on disk.

#![allow(dead_code)]

pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_DYNSYM: u32 = 11;

pub const SHF_WRITE: u64 = 0x1;
pub const SHF_ALLOC: u64 = 0x2;
pub const SHF_EXECINSTR: u64 = 0x4;

pub const STB_LOCAL: u8 = 0;
pub const STB_GLOBAL: u8 = 1;
pub const STB_WEAK: u8 = 2;
pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;

pub const EM_386: u16 = 3;
pub const EM_PPC: u16 = 20;
pub const EM_X86_64: u16 = 62;

/// Which symbol table a set of symbols goes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolTable {
    Static,
    Dynamic,
}

/// A symbol to emit
#[derive(Debug, Clone)]
pub struct Sym {
    pub name: String,
    pub value: u64,
    pub size: u64,
    pub info: u8,
    pub shndx: u16,
}

impl Sym {
    pub fn func(name: &str, value: u64, size: u64, shndx: u16) -> Self {
        Self {
            name: name.to_string(),
            value,
            size,
            info: (STB_GLOBAL << 4) | STT_FUNC,
            shndx,
        }
    }

    pub fn object(name: &str, value: u64, size: u64, shndx: u16) -> Self {
        Self {
            name: name.to_string(),
            value,
            size,
            info: (STB_LOCAL << 4) | STT_OBJECT,
            shndx,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingSection {
    name: String,
    sh_type: u32,
    flags: u64,
    addr: u64,
    data: Vec<u8>,
    size: u64,
    link: u32,
    entsize: u64,
}

/// Where things ended up in a built file
#[derive(Debug, Clone)]
pub struct Layout {
    pub data: Vec<u8>,
    pub shoff: usize,
    pub shentsize: usize,
    pub shnum: usize,
    /// File offset of each section's content, by section index
    pub content_offsets: Vec<usize>,
}

impl Layout {
    /// Offset of section header `index`
    pub fn section_header(&self, index: usize) -> usize {
        self.shoff + index * self.shentsize
    }
}

/// In-memory ELF writer
#[derive(Debug, Clone)]
pub struct ElfBuilder {
    is_64: bool,
    big_endian: bool,
    e_type: u16,
    machine: u16,
    entry: u64,
    sections: Vec<PendingSection>,
}

impl ElfBuilder {
    pub fn new(is_64: bool, big_endian: bool) -> Self {
        Self {
            is_64,
            big_endian,
            e_type: 2, // ET_EXEC
            machine: if is_64 { EM_X86_64 } else { EM_386 },
            entry: 0,
            sections: Vec::new(),
        }
    }

    pub fn elf64_le() -> Self {
        Self::new(true, false)
    }

    pub fn elf32_le() -> Self {
        Self::new(false, false)
    }

    pub fn machine(mut self, machine: u16) -> Self {
        self.machine = machine;
        self
    }

    pub fn entry(mut self, entry: u64) -> Self {
        self.entry = entry;
        self
    }

    pub fn object_type(mut self, e_type: u16) -> Self {
        self.e_type = e_type;
        self
    }

    /// Add a file-backed section. Returns its index.
    pub fn section(
        &mut self,
        name: &str,
        sh_type: u32,
        flags: u64,
        addr: u64,
        data: &[u8],
    ) -> u16 {
        self.push(PendingSection {
            name: name.to_string(),
            sh_type,
            flags,
            addr,
            data: data.to_vec(),
            size: data.len() as u64,
            link: 0,
            entsize: 0,
        })
    }

    /// Add an allocated, executable `SHT_PROGBITS` section. Returns its index.
    pub fn code(&mut self, name: &str, addr: u64, data: &[u8]) -> u16 {
        self.section(name, SHT_PROGBITS, SHF_ALLOC | SHF_EXECINSTR, addr, data)
    }

    /// Add an `SHT_NOBITS` section of `size` bytes. Returns its index.
    pub fn nobits(&mut self, name: &str, flags: u64, addr: u64, size: u64) -> u16 {
        self.push(PendingSection {
            name: name.to_string(),
            sh_type: SHT_NOBITS,
            flags,
            addr,
            data: Vec::new(),
            size,
            link: 0,
            entsize: 0,
        })
    }

    /// Add a symbol table and its string table. Returns the symbol table index.
    pub fn symbols(&mut self, table: SymbolTable, symbols: &[Sym]) -> u16 {
        let (name, strtab_name, sh_type, flags) = match table {
            SymbolTable::Static => (".symtab", ".strtab", SHT_SYMTAB, 0),
            SymbolTable::Dynamic => (".dynsym", ".dynstr", SHT_DYNSYM, SHF_ALLOC),
        };

        let mut strings = vec![0u8];
        let mut entries = vec![0u8; self.symbol_size()];
        for sym in symbols {
            let name_offset = if sym.name.is_empty() {
                0
            } else {
                let offset = strings.len() as u32;
                strings.extend_from_slice(sym.name.as_bytes());
                strings.push(0);
                offset
            };
            self.encode_symbol(&mut entries, name_offset, sym);
        }

        let symtab_index = self.sections.len() as u32 + 1;
        let entsize = self.symbol_size() as u64;
        self.push(PendingSection {
            name: name.to_string(),
            sh_type,
            flags,
            addr: 0,
            size: entries.len() as u64,
            data: entries,
            link: symtab_index + 1,
            entsize,
        });
        self.section(strtab_name, SHT_STRTAB, flags, 0, &strings);
        symtab_index as u16
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_layout().data
    }

    pub fn build_layout(&self) -> Layout {
        let header_size = if self.is_64 { 64 } else { 52 };
        let shentsize = if self.is_64 { 64 } else { 40 };

        let mut all = self.sections.clone();
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for pending in &all {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(pending.name.as_bytes());
            shstrtab.push(0);
        }
        name_offsets.push(shstrtab.len() as u32);
        shstrtab.extend_from_slice(b".shstrtab\0");
        all.push(PendingSection {
            name: ".shstrtab".to_string(),
            sh_type: SHT_STRTAB,
            flags: 0,
            addr: 0,
            size: shstrtab.len() as u64,
            data: shstrtab,
            link: 0,
            entsize: 0,
        });

        let mut data = vec![0u8; header_size];
        let mut content_offsets = vec![0usize];
        for pending in &all {
            align(&mut data, 8);
            content_offsets.push(data.len());
            data.extend_from_slice(&pending.data);
        }
        align(&mut data, 8);
        let shoff = data.len();
        let shnum = all.len() + 1;

        // Null section header
        data.extend(std::iter::repeat(0u8).take(shentsize));
        for (i, pending) in all.iter().enumerate() {
            let offset = if pending.sh_type == SHT_NOBITS {
                0
            } else {
                content_offsets[i + 1] as u64
            };
            self.encode_section_header(&mut data, name_offsets[i], pending, offset);
        }

        self.write_header(&mut data, shoff as u64, shentsize as u16, shnum as u16);

        Layout {
            data,
            shoff,
            shentsize,
            shnum,
            content_offsets,
        }
    }

    fn push(&mut self, pending: PendingSection) -> u16 {
        self.sections.push(pending);
        self.sections.len() as u16
    }

    fn symbol_size(&self) -> usize {
        if self.is_64 {
            24
        } else {
            16
        }
    }

    fn write_header(&self, data: &mut [u8], shoff: u64, shentsize: u16, shnum: u16) {
        let mut header = Vec::new();
        header.extend_from_slice(b"\x7fELF");
        header.push(if self.is_64 { 2 } else { 1 });
        header.push(if self.big_endian { 2 } else { 1 });
        header.push(1);
        header.resize(16, 0);
        self.put(&mut header, u64::from(self.e_type), 2);
        self.put(&mut header, u64::from(self.machine), 2);
        self.put(&mut header, 1, 4);
        self.put_word(&mut header, self.entry);
        self.put_word(&mut header, 0); // e_phoff
        self.put_word(&mut header, shoff);
        self.put(&mut header, 0, 4); // e_flags
        let ehsize = if self.is_64 { 64 } else { 52 };
        self.put(&mut header, ehsize, 2);
        self.put(&mut header, 0, 2); // e_phentsize
        self.put(&mut header, 0, 2); // e_phnum
        self.put(&mut header, u64::from(shentsize), 2);
        self.put(&mut header, u64::from(shnum), 2);
        self.put(&mut header, u64::from(shnum - 1), 2); // .shstrtab is last
        data[..header.len()].copy_from_slice(&header);
    }

    fn encode_section_header(
        &self,
        out: &mut Vec<u8>,
        name: u32,
        pending: &PendingSection,
        offset: u64,
    ) {
        self.put(out, u64::from(name), 4);
        self.put(out, u64::from(pending.sh_type), 4);
        self.put_word(out, pending.flags);
        self.put_word(out, pending.addr);
        self.put_word(out, offset);
        self.put_word(out, pending.size);
        self.put(out, u64::from(pending.link), 4);
        self.put(out, 0, 4); // sh_info
        self.put_word(out, 1); // sh_addralign
        self.put_word(out, pending.entsize);
    }

    fn encode_symbol(&self, out: &mut Vec<u8>, name: u32, sym: &Sym) {
        self.put(out, u64::from(name), 4);
        if self.is_64 {
            out.push(sym.info);
            out.push(0);
            self.put(out, u64::from(sym.shndx), 2);
            self.put(out, sym.value, 8);
            self.put(out, sym.size, 8);
        } else {
            self.put(out, sym.value, 4);
            self.put(out, sym.size, 4);
            out.push(sym.info);
            out.push(0);
            self.put(out, u64::from(sym.shndx), 2);
        }
    }

    fn put_word(&self, out: &mut Vec<u8>, value: u64) {
        self.put(out, value, if self.is_64 { 8 } else { 4 });
    }

    fn put(&self, out: &mut Vec<u8>, value: u64, width: usize) {
        let bytes = if self.big_endian {
            value.to_be_bytes()[8 - width..].to_vec()
        } else {
            value.to_le_bytes()[..width].to_vec()
        };
        out.extend_from_slice(&bytes);
    }
}

fn align(data: &mut Vec<u8>, to: usize) {
    while data.len() % to != 0 {
        data.push(0);
    }
}

/// 64-bit little-endian executable: `.text` (16 bytes at 0x401000) holding
/// `main`, plus `.data`, `.bss` and a static symbol table.
///
/// Section indices: 1 `.text`, 2 `.data`, 3 `.bss`, 4 `.symtab`, 5 `.strtab`,
/// 6 `.shstrtab`.
pub fn minimal_elf64() -> Vec<u8> {
    minimal_elf64_layout().data
}

pub fn minimal_elf64_layout() -> Layout {
    let mut builder = ElfBuilder::elf64_le().entry(0x401000);
    // push rbp; mov rbp, rsp; xor eax, eax; pop rbp; ret; nop padding
    let mut code = vec![0x55, 0x48, 0x89, 0xe5, 0x31, 0xc0, 0x5d, 0xc3];
    code.resize(16, 0x90);
    let text = builder.code(".text", 0x401000, &code);
    let data = builder.section(
        ".data",
        SHT_PROGBITS,
        SHF_ALLOC | SHF_WRITE,
        0x402000,
        &[1, 0, 0, 0],
    );
    builder.nobits(".bss", SHF_ALLOC | SHF_WRITE, 0x403000, 0x100);
    builder.symbols(
        SymbolTable::Static,
        &[
            Sym::func("main", 0x401000, 16, text),
            Sym::object("counter", 0x402000, 4, data),
        ],
    );
    builder.build_layout()
}
