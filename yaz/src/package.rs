//! Package lifecycle: pack, unpack, compress, uncompress, open.
//!
//! Every operation comes in two flavours:
//!
//! - **Temp variants** (`pack`, `unpack`, ...) create a uniquely named
//!   directory under the configured temp dir and return the result path.
//!   The directory belongs to the caller once the call succeeds; on failure
//!   it is removed.
//! - **`*_to` variants** write to a caller-chosen destination that must not
//!   exist yet.
//!
//! `compress`/`uncompress` are `pack`/`unpack` without a cipher.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::cipher::{Cipher, CipherError};
use crate::codec::{self, BuildReport, Entry, ExtractReport};
use crate::config::PackageConfig;
use crate::error::{YazError, YazResult};
use crate::overlay::YazFs;

/// Packs and unpacks containers under one [`PackageConfig`].
#[derive(Debug, Clone, Default)]
pub struct Packager {
    config: PackageConfig,
}

impl Packager {
    /// Create a packager with the given configuration.
    pub fn new(config: PackageConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Pack `root` into a container inside a fresh `pack-*` directory.
    pub fn pack(&self, root: &Path, cipher: Option<&dyn Cipher>) -> YazResult<PathBuf> {
        self.build_in_temp("pack-", root, cipher)
    }

    /// Pack `root` into `output`, which must not exist.
    pub fn pack_to(
        &self,
        root: &Path,
        output: &Path,
        cipher: Option<&dyn Cipher>,
    ) -> YazResult<BuildReport> {
        codec::build_new(root, output, cipher, &self.config).inspect_err(|e| {
            if !matches!(e, YazError::DestinationExists(_)) {
                discard_partial(output);
            }
        })
    }

    /// Unpack `file` into a fresh `unpack-*` directory.
    pub fn unpack(&self, file: &Path, cipher: Option<&dyn Cipher>) -> YazResult<PathBuf> {
        self.extract_in_temp("unpack-", file, cipher)
    }

    /// Unpack `file` into `output`, which must not exist.
    ///
    /// Files written before a failure are left in place.
    pub fn unpack_to(
        &self,
        file: &Path,
        output: &Path,
        cipher: Option<&dyn Cipher>,
    ) -> YazResult<ExtractReport> {
        claim_dir(output)?;
        codec::read(file, output, cipher, &self.config).inspect_err(|_| {
            // Succeeds only while nothing has been extracted.
            let _ = fs::remove_dir(output);
        })
    }

    /// Build an unencrypted container inside a fresh `compress-*` directory.
    pub fn compress(&self, root: &Path) -> YazResult<PathBuf> {
        self.build_in_temp("compress-", root, None)
    }

    /// Build an unencrypted container at `output`, which must not exist.
    pub fn compress_to(&self, root: &Path, output: &Path) -> YazResult<BuildReport> {
        self.pack_to(root, output, None)
    }

    /// Extract without decrypting into a fresh `uncompress-*` directory.
    pub fn uncompress(&self, file: &Path) -> YazResult<PathBuf> {
        self.extract_in_temp("uncompress-", file, None)
    }

    /// Extract without decrypting into `output`, which must not exist.
    pub fn uncompress_to(&self, file: &Path, output: &Path) -> YazResult<ExtractReport> {
        self.unpack_to(file, output, None)
    }

    /// Open `file` as a read-only filesystem.
    ///
    /// The container is uncompressed as-is; eligible files are decrypted on
    /// each read with `cipher`.
    pub fn open(&self, file: &Path, cipher: Option<Arc<dyn Cipher>>) -> YazResult<YazFs> {
        let root = self.uncompress(file)?;
        debug!(container = %file.display(), root = %root.display(), "Opened container");
        YazFs::with_config(root, Some(file.to_path_buf()), cipher, &self.config)
    }

    fn build_in_temp(
        &self,
        prefix: &str,
        root: &Path,
        cipher: Option<&dyn Cipher>,
    ) -> YazResult<PathBuf> {
        let dir = self.temp_workspace(prefix)?;
        let target = dir.path().join(&self.config.container_name);
        codec::build(root, &target, cipher, &self.config)?;

        let dir = dir.keep();
        Ok(dir.join(&self.config.container_name))
    }

    fn extract_in_temp(
        &self,
        prefix: &str,
        file: &Path,
        cipher: Option<&dyn Cipher>,
    ) -> YazResult<PathBuf> {
        let dir = self.temp_workspace(prefix)?;
        codec::read(file, dir.path(), cipher, &self.config)?;
        Ok(dir.keep())
    }

    fn temp_workspace(&self, prefix: &str) -> YazResult<TempDir> {
        tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(&self.config.temp_dir)
            .map_err(|e| YazError::CreateDirFailed {
                path: self.config.temp_dir.clone(),
                source: e,
            })
    }
}

/// Create `output` as a new directory, failing if anything is already there.
fn claim_dir(output: &Path) -> YazResult<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| YazError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::create_dir(output).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => YazError::DestinationExists(output.to_path_buf()),
        _ => YazError::CreateDirFailed {
            path: output.to_path_buf(),
            source: e,
        },
    })
}

fn discard_partial(output: &Path) {
    if let Err(e) = fs::remove_file(output) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %output.display(), error = %e, "Failed to remove partial container");
        }
    }
}

/// Pack with the default configuration. See [`Packager::pack`].
pub fn pack(root: &Path, cipher: Option<&dyn Cipher>) -> YazResult<PathBuf> {
    Packager::default().pack(root, cipher)
}

/// Pack with the default configuration. See [`Packager::pack_to`].
pub fn pack_to(root: &Path, output: &Path, cipher: Option<&dyn Cipher>) -> YazResult<BuildReport> {
    Packager::default().pack_to(root, output, cipher)
}

/// Unpack with the default configuration. See [`Packager::unpack`].
pub fn unpack(file: &Path, cipher: Option<&dyn Cipher>) -> YazResult<PathBuf> {
    Packager::default().unpack(file, cipher)
}

/// Unpack with the default configuration. See [`Packager::unpack_to`].
pub fn unpack_to(
    file: &Path,
    output: &Path,
    cipher: Option<&dyn Cipher>,
) -> YazResult<ExtractReport> {
    Packager::default().unpack_to(file, output, cipher)
}

/// See [`Packager::compress`].
pub fn compress(root: &Path) -> YazResult<PathBuf> {
    Packager::default().compress(root)
}

/// See [`Packager::compress_to`].
pub fn compress_to(root: &Path, output: &Path) -> YazResult<BuildReport> {
    Packager::default().compress_to(root, output)
}

/// See [`Packager::uncompress`].
pub fn uncompress(file: &Path) -> YazResult<PathBuf> {
    Packager::default().uncompress(file)
}

/// See [`Packager::uncompress_to`].
pub fn uncompress_to(file: &Path, output: &Path) -> YazResult<ExtractReport> {
    Packager::default().uncompress_to(file, output)
}

/// List container entries without extracting.
pub fn list(file: &Path) -> YazResult<Vec<Entry>> {
    codec::list(file)
}

/// Open a container as a read-only filesystem. See [`Packager::open`].
pub fn open(file: &Path, cipher: Option<Arc<dyn Cipher>>) -> YazResult<YazFs> {
    Packager::default().open(file, cipher)
}

/// Encrypt a stream.
pub fn encrypt(
    cipher: &dyn Cipher,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<(), CipherError> {
    cipher.encrypt(reader, writer)
}

/// Decrypt a stream.
pub fn decrypt(
    cipher: &dyn Cipher,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<(), CipherError> {
    cipher.decrypt(reader, writer)
}

/// Encrypt a byte slice.
pub fn encrypt_bytes(cipher: &dyn Cipher, data: &[u8]) -> Result<Vec<u8>, CipherError> {
    let mut out = Vec::new();
    encrypt(cipher, &mut &data[..], &mut out)?;
    Ok(out)
}

/// Decrypt a byte slice.
pub fn decrypt_bytes(cipher: &dyn Cipher, data: &[u8]) -> Result<Vec<u8>, CipherError> {
    let mut out = Vec::new();
    decrypt(cipher, &mut &data[..], &mut out)?;
    Ok(out)
}

/// Encrypt `file` into `output`, creating or truncating it.
pub fn encrypt_file(cipher: &dyn Cipher, file: &Path, output: &Path) -> YazResult<()> {
    transform_file(file, output, |reader, writer| encrypt(cipher, reader, writer))
}

/// Decrypt `file` into `output`, creating or truncating it.
pub fn decrypt_file(cipher: &dyn Cipher, file: &Path, output: &Path) -> YazResult<()> {
    transform_file(file, output, |reader, writer| decrypt(cipher, reader, writer))
}

fn transform_file<F>(file: &Path, output: &Path, transform: F) -> YazResult<()>
where
    F: FnOnce(&mut dyn Read, &mut dyn Write) -> Result<(), CipherError>,
{
    let reader = File::open(file).map_err(|e| YazError::ReadFailed {
        path: file.to_path_buf(),
        source: e,
    })?;
    let writer = File::create(output).map_err(|e| YazError::WriteFailed {
        path: output.to_path_buf(),
        source: e,
    })?;

    let mut writer = BufWriter::new(writer);
    transform(&mut BufReader::new(reader), &mut writer).map_err(|e| YazError::Cipher {
        path: file.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| YazError::WriteFailed {
        path: output.to_path_buf(),
        source: e,
    })
}
