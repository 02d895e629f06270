//! The two blocking external collaborators the core depends on: the record
//! extractor subprocess and the architecture-name helper library.
//!
//! Neither the [record parser](crate::record) nor the
//! [object loader](crate::object) spawn processes or load libraries
//! directly; they go through here so that every subprocess invocation in
//! the crate is built and logged the same way.
use crate::arch::Architecture;
use crate::config::LoaderConfig;
use crate::error::{self, Result};
use std::ffi::CString;
use std::path::Path;
use std::process::Command;

/// Run `emulator` with the given environment assignments (passed through
/// `-E KEY=VALUE`) and trailing arguments, returning captured stdout.
///
/// A non-zero exit status is [`crate::Error::Extractor`], carrying the full
/// command line and captured stderr so the caller can reproduce the failure
/// manually.
pub fn run_under_emulator(emulator: &str, env_assignment: &str, args: &[&str]) -> Result<String> {
    let mut cmd = Command::new(emulator);
    cmd.arg("-E").arg(env_assignment).args(args);

    log::debug!("[extractor] running {emulator} -E {env_assignment} {}", args.join(" "));

    let output = cmd.output().map_err(|e| {
        error::Error::Extractor {
            cmd: format!("{emulator} -E {env_assignment} {}", args.join(" ")),
            stderr: e.to_string(),
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        log::error!("[extractor] {emulator} exited with {:?}", output.status.code());
        return Err(error::Error::Extractor {
            cmd: format!("{emulator} -E {env_assignment} {}", args.join(" ")),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Invoke the extractor (`clextract`) for `binary_path` under the emulator
/// matching `arch`, returning its raw record stream (§6).
pub fn run_extractor(config: &LoaderConfig, arch: Architecture, binary_path: &Path) -> Result<String> {
    let emulator = format!("qemu-{}", arch.emulator_suffix());
    let clextract = config.clextract_path(arch);
    if !clextract.exists() {
        return Err(error::Error::Io {
            msg: format!("clextract binary not found at {}", clextract.display()).into(),
        });
    }
    let env_assignment = format!("LD_LIBRARY_PATH={}", config.arch_opt_dir(arch).display());
    let binary_str = binary_path.to_string_lossy().into_owned();
    let clextract_str = clextract.to_string_lossy().into_owned();
    run_under_emulator(&emulator, &env_assignment, &[&clextract_str, &binary_str])
}

/// Resolve the BFD architecture name for `binary_path` by dynamically
/// loading `cle_bfd.so` and calling its `get_bfd_arch` entry point.
pub fn get_bfd_arch(config: &LoaderConfig, binary_path: &Path) -> Result<String> {
    let lib_path = config.bfd_helper_path();
    if !lib_path.exists() {
        return Err(error::Error::Io {
            msg: format!("cannot load architecture helper, invalid path: {}", lib_path.display())
                .into(),
        });
    }

    // Safety: `cle_bfd.so` is a fixed, project-controlled library whose
    // `get_bfd_arch` signature (`extern "C" fn(*const c_char) -> *const c_char`)
    // is part of the external interface this loader targets.
    unsafe {
        let lib = libloading::Library::new(&lib_path).map_err(|e| error::Error::Io {
            msg: format!("failed to load {}: {e}", lib_path.display()).into(),
        })?;
        let get_bfd_arch: libloading::Symbol<
            unsafe extern "C" fn(*const std::os::raw::c_char) -> *const std::os::raw::c_char,
        > = lib.get(b"get_bfd_arch\0").map_err(|e| error::Error::Io {
            msg: format!("cle_bfd.so missing get_bfd_arch: {e}").into(),
        })?;

        let path_c = CString::new(binary_path.to_string_lossy().into_owned())
            .map_err(|e| error::Error::Io { msg: e.to_string().into() })?;
        let raw = get_bfd_arch(path_c.as_ptr());
        if raw.is_null() {
            return Err(error::Error::Io {
                msg: "get_bfd_arch returned a null name".into(),
            });
        }
        let name = std::ffi::CStr::from_ptr(raw).to_string_lossy().into_owned();
        Ok(name)
    }
}
