//! Symbol table entries, and the import/export classification built on top
//! of them.
use std::collections::BTreeMap;

/// `binding` field of a symbol table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Global,
    Weak,
    Local,
    Other(String),
}

impl Binding {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "STB_GLOBAL" => Binding::Global,
            "STB_WEAK" => Binding::Weak,
            "STB_LOCAL" => Binding::Local,
            other => Binding::Other(other.to_string()),
        }
    }
}

/// One symbol table entry: `name -> { address, binding, type }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub addr: u64,
    pub binding: Binding,
    /// The section-index tag, notably `SHN_UNDEF` for imports.
    pub sym_type: String,
}

impl Symbol {
    pub fn is_undefined(&self) -> bool {
        self.sym_type == "SHN_UNDEF"
    }
}

/// Whether weak-bound symbols participate in an object's export set.
///
/// The reference loader only ever admitted `STB_GLOBAL` symbols as exports
/// and flagged weak-symbol participation as an open question. This crate
/// makes that an explicit, caller-visible policy rather than a silent
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportPolicy {
    /// Only `STB_GLOBAL` symbols are exports. Matches the reference loader.
    #[default]
    GlobalOnly,
    /// `STB_GLOBAL` and `STB_WEAK` symbols are exports; a global definition
    /// takes precedence over a weak one of the same name within an object.
    IncludeWeak,
}

/// `name -> Symbol` table for one object.
pub type SymbolTable = BTreeMap<String, Symbol>;

/// Imports: symbols with `type == SHN_UNDEF`.
pub fn imports(symbols: &SymbolTable) -> BTreeMap<&str, u64> {
    symbols
        .iter()
        .filter(|(_, s)| s.is_undefined())
        .map(|(name, s)| (name.as_str(), s.addr))
        .collect()
}

/// Exports: `STB_GLOBAL` (and, under [`ExportPolicy::IncludeWeak`],
/// `STB_WEAK`) symbols with a non-undefined section.
pub fn exports(symbols: &SymbolTable, policy: ExportPolicy) -> BTreeMap<&str, u64> {
    symbols
        .iter()
        .filter(|(_, s)| {
            !s.is_undefined()
                && matches!(
                    (&s.binding, policy),
                    (Binding::Global, _) | (Binding::Weak, ExportPolicy::IncludeWeak)
                )
        })
        .map(|(name, s)| (name.as_str(), s.addr))
        .collect()
}
