//! Error types for container and overlay operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::cipher::CipherError;

/// Result type for yaz operations.
pub type YazResult<T> = Result<T, YazError>;

/// Errors that can occur while building, reading or browsing a container.
#[derive(Debug, Error)]
pub enum YazError {
    /// A `*_to` destination already exists.
    #[error("destination {} already exists", .0.display())]
    DestinationExists(PathBuf),

    /// Failed to read a file, directory or container stream.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file or container stream.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// The container holds an entry that is neither a directory nor a regular file.
    #[error("unsupported entry type {entry_type} for {path}")]
    UnsupportedEntry { path: String, entry_type: u8 },

    /// A container entry name is absolute or climbs out of the extraction root.
    #[error("unsafe entry path in container: {0}")]
    UnsafeEntryPath(String),

    /// The cipher failed to encrypt or decrypt a payload.
    #[error("cipher failed for {}: {source}", path.display())]
    Cipher { path: PathBuf, source: CipherError },

    /// A mutating operation was invoked on the read-only overlay.
    #[error("yaz is a read only filesystem: cannot {operation} {path}")]
    ReadOnly {
        operation: &'static str,
        path: String,
    },

    /// Change notification was requested from the overlay.
    #[error("yaz does not support watch")]
    WatchUnsupported,

    /// A name resolves outside the overlay root.
    #[error("path escapes the package root: {0}")]
    PathEscapesRoot(String),
}

impl YazError {
    /// Whether this is a destination-exists precondition failure.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::DestinationExists(_))
    }

    /// Whether this error was raised by the read-only guard.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly { .. } | Self::WatchUnsupported)
    }
}
