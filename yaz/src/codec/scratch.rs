//! Intermediate files for encrypt/decrypt passes.
//!
//! A [`Scratch`] is backed by a uniquely named temporary file that is
//! deleted when the value is dropped, on success and error paths alike.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{YazError, YazResult};

pub(crate) struct Scratch {
    file: NamedTempFile,
}

impl Scratch {
    /// Create a scratch file inside `dir`.
    pub(crate) fn new_in(dir: &Path) -> YazResult<Self> {
        let file = tempfile::Builder::new()
            .prefix(".yaz-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| YazError::WriteFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
        Ok(Self { file })
    }

    pub(crate) fn path(&self) -> &Path {
        self.file.path()
    }

    pub(crate) fn file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Flush and seek back to the start. Returns the scratch length.
    pub(crate) fn rewind(&mut self) -> YazResult<u64> {
        rewind_file(self.file.as_file_mut()).map_err(|e| YazError::WriteFailed {
            path: self.file.path().to_path_buf(),
            source: e,
        })
    }
}

fn rewind_file(file: &mut File) -> io::Result<u64> {
    file.flush()?;
    let len = file.seek(SeekFrom::End(0))?;
    file.seek(SeekFrom::Start(0))?;
    Ok(len)
}
