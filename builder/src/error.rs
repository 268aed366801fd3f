//! Error types for the registry builder.
//!
//! Each variant names the file or directory involved so that a failed build
//! can report exactly which source artefact went wrong and why.

use crate::signing::SignerError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while building the registry tree.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A source file name does not follow the provider naming convention.
    #[error("invalid provider file name format: {name}")]
    InvalidName {
        /// The rejected file name.
        name: String,
    },

    /// An expected file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// Path that was expected to exist.
        path: Utf8PathBuf,
    },

    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path the failing operation was applied to.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An existing versions index could not be parsed.
    ///
    /// The file is left untouched so that published data is never lost.
    #[error("corrupt versions index at {path}: {reason}")]
    CorruptIndex {
        /// Path of the unparseable index.
        path: Utf8PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Signing or key export failed.
    #[error("signing failed: {0}")]
    Signer(#[from] SignerError),

    /// A manifest could not be serialised.
    #[error("manifest serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A zip archive could not be written.
    #[error("archive error for {path}: {reason}")]
    Archive {
        /// Destination archive path.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// The source root is missing or is not a directory.
    #[error("source path is not a directory: {path}")]
    SourceNotDirectory {
        /// The offending source root.
        path: Utf8PathBuf,
    },

    /// The destination root could not be created.
    #[error("failed to create destination directory {path}: {source}")]
    DestinationUnavailable {
        /// The destination root.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Wrap an I/O error, mapping `NotFound` to [`BuildError::NotFound`].
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Returns true when the error concerns a single artefact only.
    ///
    /// Such errors are recorded in the build report and the walk continues;
    /// the remaining variants abort the whole build.
    #[must_use]
    pub fn is_per_artefact(&self) -> bool {
        !matches!(
            self,
            Self::SourceNotDirectory { .. } | Self::DestinationUnavailable { .. }
        )
    }
}

/// Result type alias using [`BuildError`].
pub type Result<T> = std::result::Result<T, BuildError>;
