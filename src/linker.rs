//! Linker/Relocator: composes the main object and its dependency closure
//! into one sparse address space, and the address-space query surface
//! built on top of the result.
use crate::arch::Endianness;
use crate::config::LoaderConfig;
use crate::error::{self, Result};
use crate::object::{Object, ObjectLoader};
use crate::resolver::{locate_soname, DependencyResolver};
use crate::symbol::ExportPolicy;
use std::collections::BTreeMap;

/// A stable reference to one of the objects owned by a [`ComposedImage`].
/// Index 0 is always the main object; larger indices are dependencies in
/// load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHandle(usize);

/// The composed, post-relocation view of a process address space: the main
/// executable plus its transitive shared-library closure, each placed at
/// its assigned base, with every jump-relocation slot patched.
///
/// The composed byte map is the sole source of truth for queries after
/// composition; each [`Object`]'s private byte map is retained only for
/// introspection (§3, Ownership).
pub struct ComposedImage {
    memory: BTreeMap<u64, u8>,
    /// `[0]` is the main object; `[1..]` are dependencies in resolver order.
    objects: Vec<Object>,
    export_policy: ExportPolicy,
}

impl ComposedImage {
    /// Compose `main` and its dependency closure, resolving exports under
    /// [`ExportPolicy::GlobalOnly`] (matching the reference loader).
    pub fn compose(main: Object, config: &LoaderConfig) -> Result<Self> {
        Self::compose_with_policy(main, config, ExportPolicy::default())
    }

    /// As [`ComposedImage::compose`], with an explicit [`ExportPolicy`] for
    /// whether weak symbols participate in relocation (§9).
    pub fn compose_with_policy(
        main: Object,
        config: &LoaderConfig,
        policy: ExportPolicy,
    ) -> Result<Self> {
        let resolved = DependencyResolver::resolve(&main, config)?;
        let mut dependencies = Vec::new();
        for (soname, base) in resolved {
            let Some(path) = locate_soname(&soname, &main.path, config) else {
                continue;
            };
            let dep = ObjectLoader::load(&path, config)?;
            dependencies.push((dep, base));
        }
        Self::compose_from_loaded(main, dependencies, policy)
    }

    /// Assemble a composed image from an already-loaded main object and
    /// dependency set, skipping dependency discovery entirely.
    ///
    /// This is the algorithm [`ComposedImage::compose`] drives after the
    /// [resolver](crate::resolver) has done its work; exposed directly for
    /// callers (and tests) that already know their object graph.
    pub fn compose_from_loaded(
        main: Object,
        dependencies: Vec<(Object, u64)>,
        policy: ExportPolicy,
    ) -> Result<Self> {
        let mut memory = BTreeMap::new();
        load_into(&mut memory, &main, 0)?;

        let mut objects = Vec::with_capacity(1 + dependencies.len());
        objects.push(main);
        for (mut dep, base) in dependencies {
            dep.rebase_addr = base;
            load_into(&mut memory, &dep, base)?;
            objects.push(dep);
        }

        let mut image = ComposedImage {
            memory,
            objects,
            export_policy: policy,
        };
        image.relocate();
        Ok(image)
    }

    fn relocate(&mut self) {
        let policy = self.export_policy;
        // Every dependency's export table, precomputed so lookups during the
        // write pass below don't need to borrow `self.objects` again.
        let dep_exports: Vec<(u64, BTreeMap<String, u64>)> = self.objects[1..]
            .iter()
            .map(|dep| {
                let exports = dep
                    .exports(policy)
                    .into_iter()
                    .map(|(name, addr)| (name.to_string(), addr))
                    .collect();
                (dep.rebase_addr, exports)
            })
            .collect();

        for obj in &self.objects {
            let jmprel = obj.jmprel.clone();
            let arch = obj.arch;
            let endianness = obj.endianness;
            let rebase = obj.rebase_addr;
            let path = obj.path.display().to_string();

            for (name, got_addr) in jmprel {
                let resolved = dep_exports
                    .iter()
                    .find_map(|(base, exports)| exports.get(&name).map(|addr| addr + base));

                match resolved {
                    Some(target) => {
                        log::debug!("[linker] relocation of {name} -> 0x{target:x} in {path}");
                        write_word(&mut self.memory, got_addr + rebase, target, arch.word_size(), endianness);
                    }
                    None => {
                        log::warn!(
                            "[linker] cannot locate symbol \"{name}\" from loaded dependencies ({path})"
                        );
                    }
                }
            }
        }
    }

    pub fn main(&self) -> &Object {
        &self.objects[0]
    }

    pub fn dependencies(&self) -> &[Object] {
        &self.objects[1..]
    }

    pub fn main_handle(&self) -> ObjectHandle {
        ObjectHandle(0)
    }

    pub fn dependency_handles(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        (1..self.objects.len()).map(ObjectHandle)
    }

    pub fn object(&self, handle: ObjectHandle) -> &Object {
        &self.objects[handle.0]
    }

    /// The raw byte at `addr` in the composed image, if loaded.
    pub fn byte_at(&self, addr: u64) -> Option<u8> {
        self.memory.get(&addr).copied()
    }

    /// Read a `width`-byte, `endianness`-ordered word starting at `addr`.
    /// `None` if any constituent byte isn't loaded.
    pub fn read_word(&self, addr: u64, width: usize, endianness: Endianness) -> Option<u64> {
        let mut bytes = Vec::with_capacity(width);
        for i in 0..width as u64 {
            bytes.push(*self.memory.get(&(addr + i))?);
        }
        let mut buf = [0u8; 8];
        match endianness {
            Endianness::Little => buf[..width].copy_from_slice(&bytes),
            Endianness::Big => buf[(8 - width)..].copy_from_slice(&bytes),
        }
        Some(match endianness {
            Endianness::Little => u64::from_le_bytes(buf),
            Endianness::Big => u64::from_be_bytes(buf),
        })
    }

    /// Rewrite the GOT slot for `name` within `handle`'s jump-relocation
    /// table to `new_addr`, regardless of the value currently there.
    ///
    /// Returns `false` (not an error) if `handle`'s object has no
    /// jump-relocation entry for `name`. This is the injection point for
    /// analysis-time stubs (simulated procedures).
    pub fn override_got(&mut self, handle: ObjectHandle, name: &str, new_addr: u64) -> bool {
        let obj = &self.objects[handle.0];
        let Some(&(_, got_addr)) = obj.jmprel.iter().find(|(n, _)| n == name) else {
            log::debug!(
                "[linker] could not override the address of symbol {name}: symbol not found"
            );
            return false;
        };
        let width = obj.arch.word_size();
        let endianness = obj.endianness;
        let rebase = obj.rebase_addr;
        write_word(&mut self.memory, got_addr + rebase, new_addr, width, endianness);
        true
    }

    /// The minimum base address of any loaded object.
    pub fn min_address(&self) -> u64 {
        let mut base = self.main().exec_base_address();
        for dep in self.dependencies() {
            if dep.rebase_addr > 0 && dep.rebase_addr < base {
                base = dep.rebase_addr;
            }
        }
        base
    }

    /// The maximum address loaded as part of any loaded object.
    pub fn max_address(&self) -> u64 {
        self.objects
            .iter()
            .map(|o| o.max_address())
            .max()
            .unwrap_or(0)
    }

    /// The object whose rebased `[base, max_address)` range strictly
    /// contains `addr`. The main binary is checked first, dependencies in
    /// load order after.
    pub fn owner(&self, addr: u64) -> Option<&Object> {
        self.objects.iter().enumerate().find_map(|(i, obj)| {
            let base = Self::object_base(i, obj);
            (addr > base && addr < obj.max_address()).then_some(obj)
        })
    }

    /// The name of the segment (of the owning object) whose rebased range
    /// contains `addr`.
    pub fn segment_name_at(&self, addr: u64) -> Option<&str> {
        for (i, obj) in self.objects.iter().enumerate() {
            let base = Self::object_base(i, obj);
            if addr > base && addr < obj.max_address() {
                let local = if i == 0 { addr } else { addr - obj.rebase_addr };
                return obj.segment_containing(local).map(|s| s.name.as_str());
            }
        }
        None
    }

    /// The first dependency (searched in load order) whose exports contain
    /// `name`, as a rebased address.
    pub fn find_symbol(&self, name: &str) -> Option<u64> {
        self.dependencies().iter().find_map(|dep| {
            dep.exports(self.export_policy)
                .get(name)
                .map(|addr| addr + dep.rebase_addr)
        })
    }

    fn object_base(index: usize, obj: &Object) -> u64 {
        if index == 0 {
            obj.exec_base_address()
        } else {
            obj.rebase_addr
        }
    }
}

fn load_into(memory: &mut BTreeMap<u64, u8>, obj: &Object, base: u64) -> Result<()> {
    for (&addr, &byte) in obj.memory.iter() {
        let target = addr + base;
        if memory.insert(target, byte).is_some() {
            return Err(error::overlap(
                target,
                format!(
                    "{} collides with an already-loaded object at this address",
                    obj.path.display()
                ),
            ));
        }
    }
    Ok(())
}

fn write_word(memory: &mut BTreeMap<u64, u8>, addr: u64, value: u64, width: usize, endianness: Endianness) {
    for (i, byte) in endianness.encode(value, width).into_iter().enumerate() {
        memory.insert(addr + i as u64, byte);
    }
}
