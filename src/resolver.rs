//! Dependency Resolver: discovers the ordered (soname, base address) set for
//! the transitive closure of shared libraries a main object requires, via
//! the dynamic-linker auditing hook, plus the fallback filesystem search
//! used to locate a soname that isn't already an absolute path.
use crate::config::LoaderConfig;
use crate::error::{self, Result};
use crate::extractor::run_under_emulator;
use crate::object::Object;
use std::fs;
use std::path::{Path, PathBuf};

/// Produce the ordered `(soname, base_address)` mapping for the transitive
/// closure of shared libraries `main` requires.
///
/// Order is the order the auditing hook emitted sonames in (§9 — the
/// reference loader lets this fall out of map iteration order; here it's a
/// stable, explicit list the linker iterates directly).
pub struct DependencyResolver;

impl DependencyResolver {
    pub fn resolve(main: &Object, config: &LoaderConfig) -> Result<Vec<(String, u64)>> {
        let emulator = format!("qemu-{}", main.arch.emulator_suffix());
        let audit_lib = config.ld_audit_path(main.arch);

        // Reserve a unique path, then free the name so the audited process
        // is the one that actually creates the file. A fixed, shared path
        // here would let concurrent linker instances stomp on each other.
        let reserved = tempfile::Builder::new()
            .prefix(".ld_audit-")
            .suffix(".out")
            .tempfile()
            .map_err(error::Error::from)?;
        let log_path = reserved.path().to_path_buf();
        reserved.close().map_err(error::Error::from)?;

        let env_assignment = format!(
            "LD_LIBRARY_PATH={},LD_AUDIT={}",
            config.emulator_library_path(main.arch),
            audit_lib.display()
        );
        let binary_str = main.path.to_string_lossy().into_owned();

        // The source doesn't check this subprocess's exit status, only
        // whether it produced a log; we preserve that, but still log a
        // non-zero exit for diagnosability.
        if let Err(e) = run_under_emulator(&emulator, &env_assignment, &[&binary_str]) {
            log::warn!("[resolver] auditing run for {binary_str} reported a failure: {e}");
        }

        let result = read_audit_log(&log_path);
        let _ = fs::remove_file(&log_path);
        result
    }
}

fn read_audit_log(log_path: &Path) -> Result<Vec<(String, u64)>> {
    if !log_path.exists() {
        return Err(error::dep_resolution(format!(
            "audit log '{}' does not exist; did the emulator fail to run?",
            log_path.display()
        )));
    }

    let contents = fs::read_to_string(log_path)?;
    let mut deps = Vec::new();
    for line in contents.lines() {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.first().map(|s| s.trim()) != Some("LIB") {
            continue;
        }
        let soname = fields
            .get(1)
            .ok_or_else(|| error::dep_resolution("LIB record missing soname"))?
            .trim()
            .to_string();
        let addr_field = fields
            .get(2)
            .ok_or_else(|| error::dep_resolution("LIB record missing address"))?
            .trim();
        let addr = u64::from_str_radix(addr_field.trim_start_matches("0x"), 16)
            .map_err(|_| error::dep_resolution(format!("invalid hex address '{addr_field}'")))?;
        log::debug!("[resolver] will load {soname} @0x{addr:x}");
        deps.push((soname, addr));
    }
    Ok(deps)
}

/// Locate `soname` on disk when it isn't already an absolute, existing path.
///
/// Searches, in order: the colon-separated `LD_LIBRARY_PATH` entries, then
/// the directory containing the main binary. Returns `None` (logged, not
/// fatal) rather than an error, matching the permissive policy of the
/// source.
pub fn locate_soname(soname: &str, main_path: &Path, config: &LoaderConfig) -> Option<PathBuf> {
    let direct = Path::new(soname);
    if direct.exists() {
        return Some(direct.to_path_buf());
    }

    let mut search_dirs = config.fallback_search_dirs();
    if let Some(parent) = main_path.parent() {
        search_dirs.push(parent.to_path_buf());
    }

    for dir in search_dirs {
        if let Some(found) = find_under(&dir, soname) {
            log::debug!("[resolver] found {soname} at {}", found.display());
            return Some(found);
        }
    }

    log::warn!("[resolver] could not find shared object {soname:?}");
    None
}

fn find_under(root: &Path, filename: &str) -> Option<PathBuf> {
    let candidate = root.join(filename);
    if candidate.is_file() {
        return Some(candidate);
    }
    let entries = fs::read_dir(root).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_under(&path, filename) {
                return Some(found);
            }
        }
    }
    None
}
