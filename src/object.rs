//! Per-object loading: turning parsed headers into a sparse virtual-memory
//! image of a single ELF object, plus the queries defined over it.
use crate::arch::{Architecture, Endianness};
use crate::config::LoaderConfig;
use crate::error::{self, Result};
use crate::extractor;
use crate::record::{self, ParsedRecords, ProgramHeader};
use crate::segment::Segment;
use crate::symbol::{self, Binding, ExportPolicy, Symbol, SymbolTable};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A loaded ELF object: either the main executable or one of its shared-library
/// dependencies.
///
/// Constructed by [`ObjectLoader`]. `rebase_addr` starts at zero and is
/// mutated exactly once, by the [linker](crate::linker), when the object is
/// placed into a composed image; every other field is immutable from
/// construction onward.
#[derive(Debug)]
pub struct Object {
    pub path: PathBuf,
    pub arch: Architecture,
    pub endianness: Endianness,
    pub program_headers: Vec<ProgramHeader>,
    pub symbols: SymbolTable,
    /// symbol name -> GOT address, in extractor-reported order.
    pub jmprel: Vec<(String, u64)>,
    pub deps: Vec<String>,
    pub entry_point: u64,
    pub segments: Vec<Segment>,
    /// Raw dynamic section entries (`dyn,...` records), tag included.
    pub dyn_entries: Vec<Vec<String>>,
    /// Private, file-relative byte map (address -> byte, pre-rebase). The
    /// source of truth after composition is the linker's composed image;
    /// this is retained for introspection only.
    pub(crate) memory: BTreeMap<u64, u8>,
    /// Zero until the linker assigns a base address to this object.
    pub rebase_addr: u64,
}

impl Object {
    /// The lower `vaddr` of text vs data. Only meaningful for
    /// position-dependent executables; shared objects typically have both
    /// at zero.
    pub fn exec_base_address(&self) -> u64 {
        let text = self.text_phdr();
        let data = self.data_phdr();
        text.vaddr.min(data.vaddr)
    }

    /// `max(text.vaddr + text.memsz, data.vaddr + data.memsz) + rebase_addr`.
    ///
    /// Tracks `rebase_addr`, so calls made before rebasing return
    /// pre-relocation values.
    pub fn max_address(&self) -> u64 {
        let text = self.text_phdr();
        let data = self.data_phdr();
        let m1 = text.vaddr + text.memsz;
        let m2 = data.vaddr + data.memsz;
        m1.max(m2) + self.rebase_addr
    }

    fn text_phdr(&self) -> &ProgramHeader {
        self.program_headers
            .iter()
            .find(|p| p.is_load() && p.filesz == p.memsz)
            .expect("Object is only constructed with a text PT_LOAD entry")
    }

    fn data_phdr(&self) -> &ProgramHeader {
        self.program_headers
            .iter()
            .find(|p| p.is_load() && p.filesz != p.memsz)
            .expect("Object is only constructed with a data PT_LOAD entry")
    }

    /// Symbols with `type == SHN_UNDEF`.
    pub fn imports(&self) -> BTreeMap<&str, u64> {
        symbol::imports(&self.symbols)
    }

    /// Symbols eligible to satisfy another object's jump-relocations, per
    /// `policy` (§9 — weak-symbol participation is an explicit choice).
    pub fn exports(&self, policy: ExportPolicy) -> BTreeMap<&str, u64> {
        symbol::exports(&self.symbols, policy)
    }

    /// The segment whose *strict-inside* range contains `addr`, matching the
    /// reference loader's (buggy) boundary behaviour.
    pub fn segment_containing(&self, addr: u64) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains_strict(addr))
    }

    /// The segment whose half-open `[start, end)` range contains `addr`.
    pub fn segment_containing_inclusive(&self, addr: u64) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains_inclusive(addr))
    }
}

/// Builds [`Object`] values, either end to end from a binary path (invoking
/// the external collaborators) or from an already-parsed record stream for
/// callers (and tests) that supply one directly.
pub struct ObjectLoader;

impl ObjectLoader {
    /// Load `path`: resolve its architecture, run the extractor, parse the
    /// record stream and materialise the object's memory image.
    pub fn load(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<Object> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(error::Error::Io {
                msg: format!("the binary file \"{}\" does not exist", path.display()).into(),
            });
        }

        log::debug!("[loader] loading binary object {}", path.display());

        let bfd_name = extractor::get_bfd_arch(config, path)?;
        let arch = Architecture::from_bfd_name(&bfd_name)?;
        let stream = extractor::run_extractor(config, arch, path)?;
        let records = record::parse_records(&stream)?;

        Self::build(path.to_path_buf(), arch, records)
    }

    /// Build an [`Object`] from an already-parsed record stream, reading
    /// segment bytes from `path`. Shared by [`ObjectLoader::load`] and by
    /// tests that exercise the loading algorithm without the extractor
    /// subprocess.
    pub fn build(path: PathBuf, arch: Architecture, records: ParsedRecords) -> Result<Object> {
        let entry_point = records
            .entry_point
            .ok_or_else(|| error::malformed("no entry point record"))?;
        let endianness = records
            .endianness
            .ok_or_else(|| error::malformed("no endianness record"))?;
        let text = records
            .text_phdr()
            .cloned()
            .ok_or_else(|| error::malformed("no program header entry for the text segment"))?;
        let data = records
            .data_phdr()
            .cloned()
            .ok_or_else(|| error::malformed("no program header entry for the data segment"))?;

        let mut file = File::open(&path)?;
        let mut memory = BTreeMap::new();
        let mut segments = Vec::new();

        load_segment(&mut file, &text, "text", &mut memory, &mut segments)?;
        load_segment(&mut file, &data, "data", &mut memory, &mut segments)?;
        load_bss(&data, &mut memory);

        let symbols: SymbolTable = records
            .symbols
            .iter()
            .map(|s| {
                (
                    s.name.clone(),
                    Symbol {
                        addr: s.addr,
                        binding: Binding::from_tag(&s.binding),
                        sym_type: s.sym_type.clone(),
                    },
                )
            })
            .collect();

        log::debug!(
            "[loader] loaded {} ({}, entry 0x{entry_point:x})",
            path.display(),
            arch
        );

        Ok(Object {
            path,
            arch,
            endianness,
            program_headers: records.program_headers,
            symbols,
            jmprel: records.jmprel,
            deps: records.needed,
            entry_point,
            segments,
            dyn_entries: records.dyn_entries,
            memory,
            rebase_addr: 0,
        })
    }
}

fn load_segment(
    file: &mut File,
    hdr: &ProgramHeader,
    name: &str,
    memory: &mut BTreeMap<u64, u8>,
    segments: &mut Vec<Segment>,
) -> Result<()> {
    file.seek(SeekFrom::Start(hdr.offset))?;
    let mut buf = vec![0u8; hdr.filesz as usize];
    file.read_exact(&mut buf)?;

    for (i, byte) in buf.into_iter().enumerate() {
        let addr = hdr.vaddr + i as u64;
        if memory.insert(addr, byte).is_some() {
            return Err(error::malformed(format!(
                "segments overlapping in memory at 0x{addr:x}"
            )));
        }
    }

    log::debug!(
        "[loader] loaded segment {name} @0x{:x} with size 0x{:x}",
        hdr.vaddr,
        hdr.filesz
    );
    segments.push(Segment::new(name, hdr.vaddr, hdr.memsz).with_file_offset(hdr.offset));
    Ok(())
}

/// The BSS section doesn't appear in the file; its size is the difference
/// between the data segment's file size and its memory size.
fn load_bss(data: &ProgramHeader, memory: &mut BTreeMap<u64, u8>) {
    let start = data.vaddr + data.filesz;
    let end = data.vaddr + data.memsz;
    for addr in start..end {
        memory.insert(addr, 0);
    }
}
