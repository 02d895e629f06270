//! Parses the extractor's flat, comma-separated record stream into typed
//! views: program headers, symbols, jump-relocations, dependencies, dynamic
//! entries, the entry point and the recorded endianness.
//!
//! Records with a discriminator this module doesn't recognise are ignored,
//! which keeps the parser forward compatible with extractor versions that
//! emit additional record kinds the core has no use for (e.g. `shdr`).
use crate::arch::Endianness;
use crate::error::{self, Result};

/// One `phdr` record: a program-header table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramHeader {
    pub offset: u64,
    pub vaddr: u64,
    pub filesz: u64,
    pub memsz: u64,
    pub align: u64,
    pub kind: String,
}

impl ProgramHeader {
    pub fn is_load(&self) -> bool {
        self.kind == "PT_LOAD"
    }
}

/// One `symtab` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord {
    pub name: String,
    pub addr: u64,
    pub binding: String,
    pub sym_type: String,
}

/// The parsed, still architecture-agnostic view of one object's records.
#[derive(Debug, Clone, Default)]
pub struct ParsedRecords {
    pub program_headers: Vec<ProgramHeader>,
    pub symbols: Vec<SymbolRecord>,
    /// symbol name -> GOT address, in the order the extractor reported them.
    pub jmprel: Vec<(String, u64)>,
    pub needed: Vec<String>,
    pub entry_point: Option<u64>,
    pub endianness: Option<Endianness>,
    pub object_type: Option<String>,
    /// Raw `dyn` records (dynamic section entries), each the full,
    /// trimmed field list of one `dyn,...` line, tag included. The core
    /// doesn't interpret these fields itself; they're retained as an
    /// object's dynamic-entry data for downstream consumers (§3).
    pub dyn_entries: Vec<Vec<String>>,
}

fn parse_int(field: &str) -> Result<u64> {
    let field = field.trim();
    let (digits, radix) = if let Some(hex) = field.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(hex) = field.strip_prefix("0X") {
        (hex, 16)
    } else {
        (field, 10)
    };
    u64::from_str_radix(digits, radix)
        .map_err(|_| error::malformed(format!("expected an integer, found '{field}'")))
}

/// Parse the extractor's newline-delimited, comma-separated record stream.
pub fn parse_records(stream: &str) -> Result<ParsedRecords> {
    let mut records = ParsedRecords::default();

    for line in stream.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        let tag = fields[0].trim();

        match tag {
            "phdr" => {
                if fields.len() < 7 {
                    return Err(error::malformed("phdr record has too few fields"));
                }
                records.program_headers.push(ProgramHeader {
                    offset: parse_int(fields[1])?,
                    vaddr: parse_int(fields[2])?,
                    filesz: parse_int(fields[3])?,
                    memsz: parse_int(fields[4])?,
                    align: parse_int(fields[5])?,
                    kind: fields[6].trim().to_string(),
                });
            }
            "symtab" => {
                if fields.len() < 10 {
                    return Err(error::malformed("symtab record has too few fields"));
                }
                records.symbols.push(SymbolRecord {
                    addr: parse_int(fields[2])?,
                    binding: fields[5].trim().to_string(),
                    sym_type: fields[8].trim().to_string(),
                    name: fields[9].trim().to_string(),
                });
            }
            "jmprel" => {
                if fields.len() < 4 {
                    return Err(error::malformed("jmprel record has too few fields"));
                }
                let got_addr = parse_int(fields[1])?;
                let name = fields[3].trim().to_string();
                records.jmprel.push((name, got_addr));
            }
            "needed" => {
                for dep in &fields[1..] {
                    let dep = dep.trim();
                    if !dep.is_empty() {
                        records.needed.push(dep.to_string());
                    }
                }
            }
            "Entry point" => {
                let addr = fields
                    .get(1)
                    .ok_or_else(|| error::malformed("Entry point record missing address"))?;
                records.entry_point = Some(parse_int(addr)?);
            }
            "Endianness" => {
                let tag = fields
                    .get(1)
                    .ok_or_else(|| error::malformed("Endianness record missing value"))?;
                records.endianness = Some(Endianness::from_tag(tag.trim())?);
            }
            "Object_type" => {
                records.object_type = fields.get(1).map(|s| s.trim().to_string());
            }
            "dyn" => {
                records
                    .dyn_entries
                    .push(fields.iter().map(|f| f.trim().to_string()).collect());
            }
            // "shdr" and anything else: retained by the extractor's output
            // but unused by the core. Ignored for forward compatibility.
            _ => {}
        }
    }

    Ok(records)
}

impl ParsedRecords {
    /// The sole `PT_LOAD` entry where `filesz == memsz` (the text segment).
    pub fn text_phdr(&self) -> Option<&ProgramHeader> {
        self.program_headers
            .iter()
            .find(|p| p.is_load() && p.filesz == p.memsz)
    }

    /// The sole `PT_LOAD` entry where `filesz != memsz` (the data segment;
    /// the difference is the BSS span).
    pub fn data_phdr(&self) -> Option<&ProgramHeader> {
        self.program_headers
            .iter()
            .find(|p| p.is_load() && p.filesz != p.memsz)
    }
}
