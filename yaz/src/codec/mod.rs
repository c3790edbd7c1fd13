//! Container codec.
//!
//! A container is a gzip-compressed tar stream holding directory and regular
//! file entries in pre-order. Entry names are root-relative and
//! `/`-separated. Payloads of encryption-eligible files are ciphertext when a
//! cipher was supplied at build time; nothing in the stream marks them, so
//! the reader must be given the same [`EncryptionPolicy`] and cipher.
//!
//! ```text
//! source tree ──► exclusion ──► eligibility ──► cipher ──► tar ──► gzip ──► container
//! container ──► gunzip ──► untar ──► eligibility ──► cipher ──► destination tree
//! ```
//!
//! [`EncryptionPolicy`]: crate::policy::EncryptionPolicy

mod build;
mod read;
mod scratch;

pub use build::{build, build_new};
pub use read::{list, read};

use std::fmt;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::{YazError, YazResult};

/// Kind of a container entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory marker.
    Directory,
    /// Regular file with a payload.
    File,
}

/// Metadata of one container entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Root-relative, `/`-separated path.
    pub path: String,

    /// Directory or regular file.
    pub kind: EntryKind,

    /// Payload length in bytes (ciphertext length for encrypted entries).
    pub size: u64,
}

impl Entry {
    /// Whether this entry is a directory marker.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Summary of a container build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Directory entries written.
    pub directories: usize,
    /// Regular file entries written.
    pub files: usize,
    /// File entries whose payload was encrypted.
    pub encrypted: usize,
    /// Source paths skipped by the exclusion policy (subtrees count once).
    pub excluded: usize,
    /// Total payload bytes written before compression.
    pub payload_bytes: u64,
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directories, {} files ({} encrypted), {} excluded, {} payload bytes",
            self.directories, self.files, self.encrypted, self.excluded, self.payload_bytes
        )
    }
}

/// Summary of a container extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Directories created.
    pub directories: usize,
    /// Files written.
    pub files: usize,
    /// Files decrypted on the way out.
    pub decrypted: usize,
    /// Total bytes written to files.
    pub bytes: u64,
}

impl fmt::Display for ExtractReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directories, {} files ({} decrypted), {} bytes",
            self.directories, self.files, self.decrypted, self.bytes
        )
    }
}

/// Copy `reader` into `writer`, attributing failures to the side that failed.
pub(crate) fn copy_stream(
    reader: &mut dyn Read,
    reader_path: &Path,
    writer: &mut dyn Write,
    writer_path: &Path,
) -> YazResult<u64> {
    let mut buffer = vec![0u8; 64 * 1024];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(YazError::ReadFailed {
                    path: reader_path.to_path_buf(),
                    source: e,
                })
            }
        };

        writer
            .write_all(&buffer[..n])
            .map_err(|e| YazError::WriteFailed {
                path: writer_path.to_path_buf(),
                source: e,
            })?;
        total += n as u64;
    }

    Ok(total)
}
