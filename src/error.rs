//! Global error handling for nearwait
//!
//! This module provides a centralized error type that can represent errors
//! from every stage of the manifest and packing pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::clipboard::ClipboardError;

/// Global error type for nearwait operations
#[derive(Error, Debug)]
pub enum NearwaitError {
    /// A path could not be expanded or made absolute
    #[error("Invalid path {path}: {reason}")]
    InvalidPath {
        /// Path as originally given
        path: String,
        /// Why normalization failed
        reason: String,
    },

    /// Walking the project tree failed
    #[error("Discovery error at {path}: {source}")]
    Discovery {
        /// Path being visited when the walk failed
        path: PathBuf,
        /// Underlying walk failure
        #[source]
        source: io::Error,
    },

    /// The manifest file could not be read or parsed
    #[error("Failed to read manifest {path}: {reason}")]
    ManifestRead {
        /// Manifest file path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The manifest file could not be written
    #[error("Failed to write manifest {path}: {source}")]
    ManifestWrite {
        /// Manifest file path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// An item passed to a toggle operation is not listed
    #[error("Item not found in manifest: {0}")]
    NotInManifest(PathBuf),

    /// Reading or writing a batch failed
    #[error("Batch error: {0}")]
    Batch(String),

    /// Tar staging or txtar bundling failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// Mutually inconsistent options
    #[error("Configuration error: {0}")]
    Config(String),

    /// Clipboard errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Specialized Result type for nearwait operations
pub type Result<T> = std::result::Result<T, NearwaitError>;

impl NearwaitError {
    /// Build an `InvalidPath` error
    pub fn invalid_path(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a `ManifestRead` error
    pub fn manifest_read(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::ManifestRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Creates a NearwaitError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::NearwaitError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for attaching an operation description to foreign errors
pub trait ResultExt<T> {
    /// Wrap the error as a `Batch` error with context
    fn batch_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;

    /// Wrap the error as an `Archive` error with context
    fn archive_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn batch_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| NearwaitError::Batch(format!("{}: {}", f(), e)))
    }

    fn archive_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| NearwaitError::Archive(format!("{}: {}", f(), e)))
    }
}

// Lets main return io::Result and exit non-zero on any error
impl From<NearwaitError> for io::Error {
    fn from(err: NearwaitError) -> Self {
        match err {
            NearwaitError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
