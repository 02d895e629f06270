//! Typed view over the environment and filesystem layout the external
//! collaborators (extractor, architecture-name helper, dependency auditor)
//! require.
use crate::arch::Architecture;
use crate::error::{self, Result};
use std::env;
use std::path::PathBuf;

/// Configuration threaded through the [extractor gateway](crate::extractor)
/// and the [dependency resolver](crate::resolver).
///
/// Constructed from environment variables by [`LoaderConfig::from_env`], or
/// explicitly for tests via [`LoaderConfig::new`]. The reference loader reads
/// `os.getenv("VIRTUAL_ENV")` directly and lets a missing value blow up deep
/// inside `os.path.join`; this type surfaces that as [`crate::Error::Config`]
/// at construction time, before any subprocess is spawned.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Root of the sibling-tool install tree (`VIRTUAL_ENV`).
    env_root: PathBuf,
    /// Colon-separated fallback search path (`LD_LIBRARY_PATH`), if set.
    ld_library_path: Option<String>,
}

impl LoaderConfig {
    pub fn new(env_root: impl Into<PathBuf>, ld_library_path: Option<String>) -> Self {
        LoaderConfig {
            env_root: env_root.into(),
            ld_library_path,
        }
    }

    /// Build a [`LoaderConfig`] from `VIRTUAL_ENV` and `LD_LIBRARY_PATH`.
    ///
    /// Fails with [`crate::Error::Config`] if `VIRTUAL_ENV` is unset, since
    /// every external collaborator is located under it.
    pub fn from_env() -> Result<Self> {
        let env_root = env::var_os("VIRTUAL_ENV").ok_or_else(|| {
            error::config("VIRTUAL_ENV is not set; cannot locate sibling tools")
        })?;
        let ld_library_path = env::var("LD_LIBRARY_PATH").ok();
        Ok(LoaderConfig::new(env_root, ld_library_path))
    }

    pub fn env_root(&self) -> &PathBuf {
        &self.env_root
    }

    pub fn ld_library_path(&self) -> Option<&str> {
        self.ld_library_path.as_deref()
    }

    /// Path to the architecture-name helper library (§6).
    pub fn bfd_helper_path(&self) -> PathBuf {
        self.env_root.join("lib").join("cle_bfd.so")
    }

    /// Directory holding the extractor and audit library for one
    /// architecture (`<env_root>/opt/<arch>/`).
    pub fn arch_opt_dir(&self, arch: Architecture) -> PathBuf {
        self.env_root.join("opt").join(arch.emulator_suffix())
    }

    /// Path to the `clextract` binary for one architecture.
    pub fn clextract_path(&self, arch: Architecture) -> PathBuf {
        self.arch_opt_dir(arch).join("clextract")
    }

    /// Path to the LD_AUDIT shared object for one architecture.
    pub fn ld_audit_path(&self, arch: Architecture) -> PathBuf {
        self.arch_opt_dir(arch).join("ld_audit.so")
    }

    /// The fallback search directories for shared-library discovery: the
    /// colon-separated `LD_LIBRARY_PATH` entries, in order.
    pub fn fallback_search_dirs(&self) -> Vec<PathBuf> {
        self.ld_library_path
            .as_deref()
            .unwrap_or("")
            .split(':')
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    /// The `LD_LIBRARY_PATH` value to pass to the emulator when invoking the
    /// extractor: the architecture's opt dir, joined with any caller-supplied
    /// `LD_LIBRARY_PATH` already present.
    pub fn emulator_library_path(&self, arch: Architecture) -> String {
        let opt_dir = self.arch_opt_dir(arch);
        match &self.ld_library_path {
            Some(existing) if !existing.is_empty() => {
                format!("{}:{}", opt_dir.display(), existing)
            }
            _ => opt_dir.display().to_string(),
        }
    }
}
