//! Static loader for ELF executables and their shared-library dependencies.
//!
//! This crate reconstructs, offline, the address-space image an operating
//! system's dynamic linker would produce for a binary: it parses program,
//! dynamic and symbol tables, materialises a sparse byte map of every
//! loaded object, resolves each object's imports against its dependency
//! closure, and patches GOT entries so that PLT call sites point at their
//! resolved targets. The result is a flat, queryable snapshot consumed by
//! downstream analysis tooling — it does not execute or disassemble
//! anything.
//!
//! The pipeline is staged and one-directional: parse the main binary's
//! records, load it, resolve its dependency closure, load each dependency,
//! then relocate. No stage mutates an earlier stage's output, and no query
//! on the composed image is meaningful before relocation completes.
//!
//! ```no_run
//! use elf_cle::{load_image, LoaderConfig};
//!
//! let config = LoaderConfig::from_env()?;
//! let image = load_image("/bin/ls", &config)?;
//! println!("entry point: 0x{:x}", image.main().entry_point);
//! # Ok::<(), elf_cle::Error>(())
//! ```
pub mod arch;
pub mod config;
pub mod error;
pub mod extractor;
pub mod linker;
pub mod object;
pub mod record;
pub mod resolver;
pub mod segment;
pub mod symbol;

pub use arch::{Architecture, Endianness};
pub use config::LoaderConfig;
pub use error::{Error, Result};
pub use linker::{ComposedImage, ObjectHandle};
pub use object::{Object, ObjectLoader};
pub use segment::Segment;
pub use symbol::{Binding, ExportPolicy, Symbol};

use std::path::Path;

/// Load `path` and its full shared-library dependency closure, producing a
/// composed, relocated address-space image.
///
/// This is the crate's one-call public surface: equivalent to
/// [`ObjectLoader::load`] followed by [`ComposedImage::compose`].
pub fn load_image(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<ComposedImage> {
    let main = ObjectLoader::load(path, config)?;
    ComposedImage::compose(main, config)
}
