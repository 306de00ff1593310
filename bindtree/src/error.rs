//! Error types for manifest loading and generation.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed manifest entry (missing or duplicate `path`).
    #[error("invalid manifest: {0}")]
    Validation(String),

    #[error("failed to parse manifest {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The translator exited with a non-zero status (strict mode only).
    #[error("translator exited with {status} for {}", header.display())]
    Translator { header: PathBuf, status: ExitStatus },
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}
