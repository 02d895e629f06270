//! Architecture tag canonicalisation.
//!
//! The extractor and architecture-name helper report BFD-style architecture
//! names (`i386:x86-64`, `armv4t`, ...). This module is the sole place that
//! knows how those names map onto the emulator's `qemu-<suffix>` naming
//! convention and onto the analyser's own tag set.
use crate::error::{self, Result};
use std::fmt;

/// A closed enumeration of the architectures this loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86,
    Amd64,
    Mips32,
    Ppc32,
    Arm,
}

impl Architecture {
    /// Canonicalise a BFD-style architecture name as reported by the
    /// architecture-name helper (`get_bfd_arch`).
    ///
    /// Fails with [`crate::Error::UnsupportedArchitecture`] on any name
    /// outside the table in §6 of the specification.
    pub fn from_bfd_name(name: &str) -> Result<Self> {
        match name {
            "i386:x86-64" => Ok(Architecture::Amd64),
            "mips:isa32" => Ok(Architecture::Mips32),
            "powerpc:common" => Ok(Architecture::Ppc32),
            "armv4t" => Ok(Architecture::Arm),
            "i386" => Ok(Architecture::X86),
            other => Err(error::unsupported_arch(other.to_string())),
        }
    }

    /// The `qemu-<suffix>` command suffix used to invoke the emulator for
    /// this architecture.
    pub fn emulator_suffix(self) -> &'static str {
        match self {
            Architecture::X86 => "i386",
            Architecture::Amd64 => "x86_64",
            Architecture::Mips32 => "mips",
            Architecture::Ppc32 => "ppc",
            Architecture::Arm => "arm",
        }
    }

    /// The analyser-native name for this architecture (e.g. for tagging
    /// downstream symbolic-execution state).
    pub fn analyser_name(self) -> &'static str {
        match self {
            Architecture::X86 => "X86",
            Architecture::Amd64 => "AMD64",
            Architecture::Mips32 => "MIPS32",
            Architecture::Ppc32 => "PPC32",
            Architecture::Arm => "ARM",
        }
    }

    /// Native pointer width in bytes, used to size GOT-slot writes.
    pub fn word_size(self) -> usize {
        match self {
            Architecture::Amd64 => 8,
            Architecture::X86 | Architecture::Mips32 | Architecture::Ppc32 | Architecture::Arm => {
                4
            }
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.analyser_name())
    }
}

/// Byte order of the loaded object, as reported by the extractor's
/// `Endianness` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "LSB" => Ok(Endianness::Little),
            "MSB" => Ok(Endianness::Big),
            other => Err(error::malformed(format!(
                "unrecognised endianness tag: {other}"
            ))),
        }
    }

    /// Encode `value` into `width` bytes using this byte order.
    pub fn encode(self, value: u64, width: usize) -> Vec<u8> {
        let full = match self {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        match self {
            Endianness::Little => full[..width].to_vec(),
            Endianness::Big => full[(8 - width)..].to_vec(),
        }
    }
}
