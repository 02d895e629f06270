//! A named, contiguous virtual-address range within a single loaded object.
use std::fmt;

/// Simple representation of an ELF segment, as materialised by the
/// [object loader](crate::object).
///
/// Containment uses the *strict-inside* rule inherited from the reference
/// loader this crate reimplements: an address equal to `virtual_address` or
/// to `virtual_address + size_in_memory` does not belong to the segment.
/// That is almost certainly a historical bug, but callers that need
/// behavioral parity rely on it, so [`Segment::contains_strict`] preserves
/// it and [`Segment::contains_inclusive`] offers the corrected, closed-range
/// alternative alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub virtual_address: u64,
    pub size_in_memory: u64,
    pub file_offset: Option<u64>,
}

impl Segment {
    pub fn new(name: impl Into<String>, virtual_address: u64, size_in_memory: u64) -> Self {
        Segment {
            name: name.into(),
            virtual_address,
            size_in_memory,
            file_offset: None,
        }
    }

    pub fn with_file_offset(mut self, offset: u64) -> Self {
        self.file_offset = Some(offset);
        self
    }

    pub fn end(&self) -> u64 {
        self.virtual_address + self.size_in_memory
    }

    /// Behavioral-parity containment test: strict on both ends.
    pub fn contains_strict(&self, addr: u64) -> bool {
        addr > self.virtual_address && addr < self.end()
    }

    /// Corrected containment test: closed on the low end, open on the high
    /// end, matching the conventional `[start, end)` half-open range.
    pub fn contains_inclusive(&self, addr: u64) -> bool {
        addr >= self.virtual_address && addr < self.end()
    }

    /// Do two segments' virtual-address ranges overlap? Used to enforce the
    /// non-overlap invariant within a single object.
    pub fn overlaps(&self, other: &Segment) -> bool {
        self.virtual_address < other.end() && other.virtual_address < self.end()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @0x{:x} (size 0x{:x})",
            self.name, self.virtual_address, self.size_in_memory
        )
    }
}
