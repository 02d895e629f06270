mod common;

use common::load_synthetic;
use elf_cle::record::{ParsedRecords, ProgramHeader};
use elf_cle::{Architecture, ComposedImage, Endianness, ExportPolicy, ObjectLoader};
use std::io::Write;

#[test]
fn lone_static_i386_executable() {
    let (_file, main) = load_synthetic(
        Architecture::X86,
        0x08048000,
        0x1000,
        0x08049000,
        0x100,
        0x200,
        0x08048410,
        vec![],
        vec![],
        vec![],
    );

    let image = ComposedImage::compose_from_loaded(main, vec![], ExportPolicy::default())
        .expect("compose lone executable");

    assert_eq!(image.min_address(), 0x08048000);
    assert_eq!(image.max_address(), 0x08049200);

    for addr in 0x08049100u64..0x08049200 {
        assert_eq!(image.byte_at(addr), Some(0), "bss byte at 0x{addr:x} should be zeroed");
    }
}

#[test]
fn entry_point_is_exposed_verbatim() {
    let (_file, main) = load_synthetic(
        Architecture::Amd64,
        0x400000,
        0x200,
        0x601000,
        0x10,
        0x10,
        0x400410,
        vec![],
        vec![],
        vec![],
    );

    assert_eq!(main.entry_point, 0x400410);
}

#[test]
fn segments_use_strict_inside_containment() {
    let (_file, main) = load_synthetic(
        Architecture::X86,
        0x08048000,
        0x1000,
        0x08049000,
        0x100,
        0x200,
        0x08048410,
        vec![],
        vec![],
        vec![],
    );

    // Boundary addresses belong to neither segment under the strict rule...
    assert!(main.segment_containing(0x08048000).is_none());
    assert!(main.segment_containing(0x08049000).is_none());
    assert!(main.segment_containing(0x08049200).is_none());
    // ...but do under the corrected half-open rule.
    assert!(main.segment_containing_inclusive(0x08049000).is_some());
    assert!(main.segment_containing_inclusive(0x08049200).is_none());
    // An interior address belongs under both rules.
    assert!(main.segment_containing(0x08048800).is_some());
}

#[test]
fn object_owns_its_dynamic_entries() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xAAu8; 0x10]).unwrap();
    file.write_all(&[0xBBu8; 0x10]).unwrap();
    file.flush().unwrap();

    let records = ParsedRecords {
        program_headers: vec![
            ProgramHeader {
                offset: 0,
                vaddr: 0x400000,
                filesz: 0x10,
                memsz: 0x10,
                align: 0x1000,
                kind: "PT_LOAD".to_string(),
            },
            ProgramHeader {
                offset: 0x10,
                vaddr: 0x601000,
                filesz: 0x10,
                memsz: 0x10,
                align: 0x1000,
                kind: "PT_LOAD".to_string(),
            },
        ],
        symbols: vec![],
        jmprel: vec![],
        needed: vec![],
        entry_point: Some(0x400000),
        endianness: Some(Endianness::Little),
        object_type: Some("ET_DYN".to_string()),
        dyn_entries: vec![vec!["dyn".to_string(), "DT_NEEDED".to_string(), "libc.so.6".to_string()]],
    };

    let object = ObjectLoader::build(file.path().to_path_buf(), Architecture::Amd64, records)
        .expect("build object with dynamic entries");

    assert_eq!(
        object.dyn_entries,
        vec![vec!["dyn".to_string(), "DT_NEEDED".to_string(), "libc.so.6".to_string()]]
    );
}
