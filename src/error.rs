use std::path::PathBuf;
use thiserror::Error;

/// Caller-facing errors for a search session.
#[derive(Error, Debug)]
pub enum SiftError {
    // Criteria construction
    #[error("malformed expression `{input}`: {reason}")]
    Parse { input: String, reason: String },

    // Root declaration
    #[error("invalid root {0:?}")]
    InvalidRoot(PathBuf),

    // Execution
    #[error("no supported adapter for {0:?}")]
    NoSupportedAdapter(PathBuf),

    #[error("no root declared")]
    NoRootDeclared,

    // Peripheral I/O (storage, symbol map)
    #[error("I/O error at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SiftError {
    pub(crate) fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The path this error occurred at, if applicable.
    /// Callers use this to present "skipped: <path>" without pattern matching on variants.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::InvalidRoot(p) | Self::NoSupportedAdapter(p) | Self::Io { path: p, .. } => {
                Some(p)
            }
            _ => None,
        }
    }
}

/// Runtime failure of a single adapter execution.
///
/// Never surfaced to callers directly: the chain treats it as "try the next
/// adapter" and only when every supporting adapter has failed does the root
/// collapse into [`SiftError::NoSupportedAdapter`].
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("walk failed at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn `{utility}`")]
    Spawn {
        utility: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{utility}` exited with {status}")]
    Utility { utility: String, status: String },

    #[error("archive error in {archive:?}: {reason}")]
    Archive { archive: PathBuf, reason: String },
}

impl AdapterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
