//! Error types returned by the loader.
use std::borrow::Cow;
use std::fmt::{self, Display};

/// Error types used throughout the loader.
///
/// Each variant is a distinct failure kind so that callers of [`crate::load_image`]
/// can discriminate on the stage that failed rather than matching on a message string.
#[derive(Debug)]
pub enum Error {
    /// A binary or an expected auxiliary file (e.g. the audit log) could not be read.
    Io { msg: Cow<'static, str> },

    /// The extractor or emulator subprocess exited with a non-zero status.
    Extractor {
        /// The command line that was invoked.
        cmd: String,
        /// Captured stderr from the failed invocation.
        stderr: String,
    },

    /// An architecture tag produced by the architecture-name helper is not in
    /// the [`crate::arch::Architecture`] catalogue.
    UnsupportedArchitecture { tag: Cow<'static, str> },

    /// The record parser could not derive a required field, or a segment
    /// overlaps another within the same object.
    MalformedObject { msg: Cow<'static, str> },

    /// Two objects collided in the composed image after rebasing.
    Overlap { addr: u64, msg: Cow<'static, str> },

    /// The dependency-auditing log was absent or could not be parsed.
    DependencyResolution { msg: Cow<'static, str> },

    /// A required environment variable or a filesystem path derived from it
    /// was missing.
    Config { msg: Cow<'static, str> },
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { msg } => write!(f, "I/O error: {msg}"),
            Error::Extractor { cmd, stderr } => {
                write!(f, "extractor failed: `{cmd}`: {stderr}")
            }
            Error::UnsupportedArchitecture { tag } => {
                write!(f, "unsupported architecture: {tag}")
            }
            Error::MalformedObject { msg } => write!(f, "malformed object: {msg}"),
            Error::Overlap { addr, msg } => write!(f, "overlap at 0x{addr:x}: {msg}"),
            Error::DependencyResolution { msg } => {
                write!(f, "dependency resolution failed: {msg}")
            }
            Error::Config { msg } => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    #[cold]
    fn from(value: std::io::Error) -> Self {
        Error::Io {
            msg: value.to_string().into(),
        }
    }
}

#[cold]
#[inline(never)]
pub(crate) fn malformed(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::MalformedObject { msg: msg.into() }
}

#[cold]
#[inline(never)]
pub(crate) fn unsupported_arch(tag: impl Into<Cow<'static, str>>) -> Error {
    Error::UnsupportedArchitecture { tag: tag.into() }
}

#[cold]
#[inline(never)]
pub(crate) fn overlap(addr: u64, msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Overlap {
        addr,
        msg: msg.into(),
    }
}

#[cold]
#[inline(never)]
pub(crate) fn dep_resolution(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::DependencyResolution { msg: msg.into() }
}

#[cold]
#[inline(never)]
pub(crate) fn config(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Config { msg: msg.into() }
}

pub type Result<T> = std::result::Result<T, Error>;
