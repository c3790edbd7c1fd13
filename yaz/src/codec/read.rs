//! Container reading and listing.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Component, Path};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, info};

use super::scratch::Scratch;
use super::{copy_stream, Entry, EntryKind, ExtractReport};
use crate::cipher::Cipher;
use crate::config::PackageConfig;
use crate::error::{YazError, YazResult};
use crate::path::join_components;

/// Extract the container at `container` into `dest`.
///
/// `dest` and any missing parents are created. Entries are written as they
/// are decoded; on error, files already written stay behind and the caller
/// decides what to do with `dest`.
pub fn read(
    container: &Path,
    dest: &Path,
    cipher: Option<&dyn Cipher>,
    config: &PackageConfig,
) -> YazResult<ExtractReport> {
    let mut archive = open_archive(container)?;
    fs::create_dir_all(dest).map_err(|e| YazError::CreateDirFailed {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let read_failed = |e| YazError::ReadFailed {
        path: container.to_path_buf(),
        source: e,
    };

    let mut report = ExtractReport::default();
    for entry in archive.entries().map_err(read_failed)? {
        let mut entry = entry.map_err(read_failed)?;
        let (name, parts) = entry_name(&entry)?;
        let entry_type = entry.header().entry_type();
        let target = join_components(dest, &parts);

        if entry_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| YazError::CreateDirFailed {
                path: target.clone(),
                source: e,
            })?;
            report.directories += 1;
            debug!(path = %name, "Created directory");
            continue;
        }

        if !entry_type.is_file() || parts.is_empty() {
            return Err(YazError::UnsupportedEntry {
                path: name,
                entry_type: entry_type.as_byte(),
            });
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| YazError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file = File::create(&target).map_err(|e| YazError::WriteFailed {
            path: target.clone(),
            source: e,
        })?;
        let mut output = BufWriter::new(file);

        let written = match cipher {
            Some(cipher) if config.encryption.eligible_path(&name) => {
                let mut scratch = Scratch::new_in(&config.temp_dir)?;
                cipher
                    .decrypt(&mut entry, scratch.file_mut())
                    .map_err(|e| YazError::Cipher {
                        path: target.clone(),
                        source: e,
                    })?;
                scratch.rewind()?;

                let scratch_path = scratch.path().to_path_buf();
                let written = copy_stream(scratch.file_mut(), &scratch_path, &mut output, &target)?;
                report.decrypted += 1;
                written
            }
            _ => copy_stream(&mut entry, container, &mut output, &target)?,
        };

        output.flush().map_err(|e| YazError::WriteFailed {
            path: target.clone(),
            source: e,
        })?;

        report.files += 1;
        report.bytes += written;
        debug!(path = %name, bytes = written, "Extracted file");
    }

    info!(
        container = %container.display(),
        dest = %dest.display(),
        directories = report.directories,
        files = report.files,
        decrypted = report.decrypted,
        "Extracted container"
    );

    Ok(report)
}

/// List the entries of a container without extracting it.
pub fn list(container: &Path) -> YazResult<Vec<Entry>> {
    let mut archive = open_archive(container)?;
    let read_failed = |e| YazError::ReadFailed {
        path: container.to_path_buf(),
        source: e,
    };

    let mut entries = Vec::new();
    for entry in archive.entries().map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let (name, _) = entry_name(&entry)?;
        let entry_type = entry.header().entry_type();

        let kind = if entry_type.is_dir() {
            EntryKind::Directory
        } else if entry_type.is_file() {
            EntryKind::File
        } else {
            return Err(YazError::UnsupportedEntry {
                path: name,
                entry_type: entry_type.as_byte(),
            });
        };

        entries.push(Entry {
            path: name,
            kind,
            size: entry.size(),
        });
    }

    Ok(entries)
}

fn open_archive(container: &Path) -> YazResult<Archive<GzDecoder<BufReader<File>>>> {
    let file = File::open(container).map_err(|e| YazError::ReadFailed {
        path: container.to_path_buf(),
        source: e,
    })?;
    Ok(Archive::new(GzDecoder::new(BufReader::new(file))))
}

/// Validate an entry name and split it into components.
///
/// Names that are absolute or contain `..` are rejected; `.` components are
/// dropped.
fn entry_name<R: Read>(entry: &tar::Entry<'_, R>) -> YazResult<(String, Vec<String>)> {
    let path = entry.path().map_err(|e| YazError::UnsafeEntryPath(e.to_string()))?;

    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(YazError::UnsafeEntryPath(path.display().to_string()));
            }
        }
    }

    Ok((parts.join("/"), parts))
}
