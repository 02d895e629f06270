use elf_cle::record::parse_records;
use elf_cle::{Endianness, Error};

#[test]
fn parses_entry_point_endianness_and_phdrs_ignoring_unknown_tags() {
    let stream = "\
Entry point,0x400410
Endianness,LSB
phdr,0x0,0x400000,0x1000,0x1000,0x1000,PT_LOAD
shdr,.text,0x400000,0x1000
dyn,DT_NEEDED,libc.so.6
";
    let records = parse_records(stream).expect("well-formed stream parses");

    assert_eq!(records.entry_point, Some(0x400410));
    assert_eq!(records.endianness, Some(Endianness::Little));
    assert_eq!(records.program_headers.len(), 1);
    assert_eq!(records.program_headers[0].vaddr, 0x400000);
    assert!(records.program_headers[0].is_load());
    assert_eq!(
        records.dyn_entries,
        vec![vec![
            "dyn".to_string(),
            "DT_NEEDED".to_string(),
            "libc.so.6".to_string()
        ]]
    );
}

#[test]
fn dyn_records_are_captured_verbatim_and_in_order() {
    let stream = "\
dyn,DT_NEEDED,libc.so.6
dyn,DT_STRTAB,0x400200
";
    let records = parse_records(stream).unwrap();
    assert_eq!(
        records.dyn_entries,
        vec![
            vec!["dyn".to_string(), "DT_NEEDED".to_string(), "libc.so.6".to_string()],
            vec!["dyn".to_string(), "DT_STRTAB".to_string(), "0x400200".to_string()],
        ]
    );
}

#[test]
fn needed_record_collects_every_trailing_field() {
    let stream = "needed,libc.so.6,libm.so.6,libpthread.so.0\n";
    let records = parse_records(stream).unwrap();
    assert_eq!(
        records.needed,
        vec!["libc.so.6", "libm.so.6", "libpthread.so.0"]
    );
}

#[test]
fn jmprel_record_captures_got_address_and_symbol_name() {
    let stream = "jmprel,0x601018,R_X86_64_JUMP_SLOT,puts\n";
    let records = parse_records(stream).unwrap();
    assert_eq!(records.jmprel, vec![("puts".to_string(), 0x601018)]);
}

#[test]
fn symtab_record_with_a_non_integer_address_is_malformed() {
    let stream = "symtab,0,not_a_number,0,0,STB_GLOBAL,0,0,1,main\n";
    let result = parse_records(stream);
    match result {
        Err(Error::MalformedObject { msg }) => {
            assert!(msg.contains("not_a_number"), "message was: {msg}");
        }
        other => panic!("expected Error::MalformedObject, got {other:?}"),
    }
}

#[test]
fn blank_lines_are_skipped() {
    let stream = "\nEntry point,0x1\n\n";
    let records = parse_records(stream).unwrap();
    assert_eq!(records.entry_point, Some(1));
}
