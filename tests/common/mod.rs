#![allow(dead_code)]

use elf_cle::record::{ParsedRecords, ProgramHeader, SymbolRecord};
use elf_cle::{Architecture, Endianness, Object, ObjectLoader};
use std::io::Write;
use tempfile::NamedTempFile;

/// Build a synthetic object on disk with one text and one data `PT_LOAD`
/// segment, and run it through [`ObjectLoader::build`] with the given
/// symbol/relocation/dependency records. The extractor subprocess and the
/// architecture-name helper are never invoked; the caller supplies the
/// records an extractor run would otherwise have produced.
#[allow(clippy::too_many_arguments)]
pub fn load_synthetic(
    arch: Architecture,
    text_vaddr: u64,
    text_size: u64,
    data_vaddr: u64,
    data_filesz: u64,
    data_memsz: u64,
    entry_point: u64,
    symbols: Vec<SymbolRecord>,
    jmprel: Vec<(String, u64)>,
    needed: Vec<String>,
) -> (NamedTempFile, Object) {
    let mut file = NamedTempFile::new().expect("create fixture file");
    file.write_all(&vec![0xAAu8; text_size as usize]).unwrap();
    file.write_all(&vec![0xBBu8; data_filesz as usize]).unwrap();
    file.flush().unwrap();

    let records = ParsedRecords {
        program_headers: vec![
            ProgramHeader {
                offset: 0,
                vaddr: text_vaddr,
                filesz: text_size,
                memsz: text_size,
                align: 0x1000,
                kind: "PT_LOAD".to_string(),
            },
            ProgramHeader {
                offset: text_size,
                vaddr: data_vaddr,
                filesz: data_filesz,
                memsz: data_memsz,
                align: 0x1000,
                kind: "PT_LOAD".to_string(),
            },
        ],
        symbols,
        jmprel,
        needed,
        entry_point: Some(entry_point),
        endianness: Some(Endianness::Little),
        object_type: Some("ET_EXEC".to_string()),
        dyn_entries: Vec::new(),
    };

    let path = file.path().to_path_buf();
    let object = ObjectLoader::build(path, arch, records).expect("build synthetic object");
    (file, object)
}

pub fn defined_symbol(name: &str, addr: u64, binding: &str) -> SymbolRecord {
    SymbolRecord {
        name: name.to_string(),
        addr,
        binding: binding.to_string(),
        sym_type: "1".to_string(),
    }
}

pub fn undefined_symbol(name: &str, binding: &str) -> SymbolRecord {
    SymbolRecord {
        name: name.to_string(),
        addr: 0,
        binding: binding.to_string(),
        sym_type: "SHN_UNDEF".to_string(),
    }
}
