//! Container building.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{EntryType, Header, HeaderMode};
use tracing::{debug, info, warn};

use super::scratch::Scratch;
use super::BuildReport;
use crate::cipher::Cipher;
use crate::config::PackageConfig;
use crate::error::{YazError, YazResult};
use crate::tree::{walk_preorder, Descend, NodeKind, TreeNode};

type ContainerWriter = tar::Builder<GzEncoder<BufWriter<File>>>;

/// Build a container at `target` from the tree under `source`.
///
/// `target` is created or truncated; use [`build_new`] when it must not
/// exist. On error the target is left in an unspecified state.
///
/// # Arguments
///
/// * `source` - Root of the tree to package
/// * `target` - Container file to write
/// * `cipher` - Encrypts eligible files when present
/// * `config` - Exclusion and encryption policies, scratch location
pub fn build(
    source: &Path,
    target: &Path,
    cipher: Option<&dyn Cipher>,
    config: &PackageConfig,
) -> YazResult<BuildReport> {
    let target = absolute(target)?;
    let file = File::create(&target).map_err(|e| YazError::WriteFailed {
        path: target.clone(),
        source: e,
    })?;
    build_into(source, &target, file, cipher, config)
}

/// Like [`build`], but `target` is created exclusively.
///
/// Fails with [`YazError::DestinationExists`] when anything already sits at
/// `target`; that file is never opened for writing.
pub fn build_new(
    source: &Path,
    target: &Path,
    cipher: Option<&dyn Cipher>,
    config: &PackageConfig,
) -> YazResult<BuildReport> {
    let target = absolute(target)?;
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => YazError::DestinationExists(target.clone()),
            _ => YazError::WriteFailed {
                path: target.clone(),
                source: e,
            },
        })?;
    build_into(source, &target, file, cipher, config)
}

fn build_into(
    source: &Path,
    target: &Path,
    file: File,
    cipher: Option<&dyn Cipher>,
    config: &PackageConfig,
) -> YazResult<BuildReport> {
    let source = absolute(source)?;
    let mut builder = tar::Builder::new(GzEncoder::new(
        BufWriter::new(file),
        Compression::default(),
    ));

    let mut report = BuildReport::default();
    walk_preorder(&source, &mut |node| {
        if node.relative.is_empty() {
            return Ok(Descend::Into);
        }

        if config.exclusion.excluded(node.relative) {
            debug!(path = node.relative, "Excluded from container");
            report.excluded += 1;
            return Ok(Descend::Skip);
        }

        if node.path == target {
            return Ok(Descend::Skip);
        }

        match node.kind {
            NodeKind::Directory => {
                append_directory(&mut builder, node, target)?;
                report.directories += 1;
            }
            NodeKind::File => {
                let (size, encrypted) = append_file(&mut builder, node, target, cipher, config)?;
                report.files += 1;
                report.payload_bytes += size;
                if encrypted {
                    report.encrypted += 1;
                }
            }
            NodeKind::Other => {
                warn!(path = node.relative, "Skipping entry that is not a file or directory");
            }
        }

        Ok(Descend::Into)
    })?;

    finish(builder, target)?;

    info!(
        source = %source.display(),
        target = %target.display(),
        directories = report.directories,
        files = report.files,
        encrypted = report.encrypted,
        excluded = report.excluded,
        "Built container"
    );

    Ok(report)
}

fn append_directory(
    builder: &mut ContainerWriter,
    node: &TreeNode<'_>,
    target: &Path,
) -> YazResult<()> {
    let mut header = Header::new_gnu();
    header.set_metadata_in_mode(node.metadata, HeaderMode::Deterministic);
    header.set_entry_type(EntryType::Directory);
    header.set_size(0);

    builder
        .append_data(&mut header, node.relative, std::io::empty())
        .map_err(|e| YazError::WriteFailed {
            path: target.to_path_buf(),
            source: e,
        })?;

    debug!(path = node.relative, "Wrote directory entry");
    Ok(())
}

/// Append one regular file. Returns the payload size and whether it was encrypted.
fn append_file(
    builder: &mut ContainerWriter,
    node: &TreeNode<'_>,
    target: &Path,
    cipher: Option<&dyn Cipher>,
    config: &PackageConfig,
) -> YazResult<(u64, bool)> {
    let mut source = File::open(node.path).map_err(|e| YazError::ReadFailed {
        path: node.path.to_path_buf(),
        source: e,
    })?;

    let mut header = Header::new_gnu();
    header.set_metadata_in_mode(node.metadata, HeaderMode::Deterministic);
    header.set_entry_type(EntryType::Regular);

    let write_failed = |e| YazError::WriteFailed {
        path: target.to_path_buf(),
        source: e,
    };

    match cipher {
        Some(cipher) if config.encryption.eligible_path(node.relative) => {
            let mut scratch = Scratch::new_in(&config.temp_dir)?;
            cipher
                .encrypt(&mut source, scratch.file_mut())
                .map_err(|e| YazError::Cipher {
                    path: node.path.to_path_buf(),
                    source: e,
                })?;

            let size = scratch.rewind()?;
            header.set_size(size);
            builder
                .append_data(&mut header, node.relative, scratch.file_mut().take(size))
                .map_err(write_failed)?;

            debug!(
                path = node.relative,
                size,
                scratch = %scratch.path().display(),
                "Wrote encrypted file entry"
            );
            Ok((size, true))
        }
        _ => {
            let size = node.metadata.len();
            header.set_size(size);
            builder
                .append_data(&mut header, node.relative, (&mut source).take(size))
                .map_err(write_failed)?;

            debug!(path = node.relative, size, "Wrote file entry");
            Ok((size, false))
        }
    }
}

fn finish(builder: ContainerWriter, target: &Path) -> YazResult<()> {
    let write_failed = |e| YazError::WriteFailed {
        path: target.to_path_buf(),
        source: e,
    };

    let encoder = builder.into_inner().map_err(write_failed)?;
    let mut writer = encoder.finish().map_err(write_failed)?;
    writer.flush().map_err(write_failed)?;
    Ok(())
}

fn absolute(path: &Path) -> YazResult<PathBuf> {
    std::path::absolute(path).map_err(|e| YazError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::KeystreamCipher;
    use crate::codec::{list, EntryKind};
    use crate::policy::ExclusionPolicy;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(root: &Path) {
        fs::create_dir_all(root.join("models")).unwrap();
        fs::create_dir_all(root.join("data")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("app.yao"), "{\"name\": \"demo\"}").unwrap();
        fs::write(root.join("models/user.mod.yao"), "{\"table\": \"user\"}").unwrap();
        fs::write(root.join("models/icon.png"), [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(root.join("data/app.db"), "sqlite").unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
    }

    #[test]
    fn test_build_writes_preorder_entries() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app");
        fixture(&source);
        let target = temp.path().join("app.yaz");

        let report = build(&source, &target, None, &PackageConfig::default()).unwrap();

        assert_eq!(report.directories, 1);
        assert_eq!(report.files, 3);
        assert_eq!(report.encrypted, 0);
        assert_eq!(report.excluded, 2);

        let entries = list(&target).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            names,
            ["app.yao", "models", "models/icon.png", "models/user.mod.yao"]
        );
        assert_eq!(entries[1].kind, EntryKind::Directory);
    }

    #[test]
    fn test_build_encrypts_only_eligible_files() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app");
        fixture(&source);
        let target = temp.path().join("app.yaz");
        let cipher = KeystreamCipher::new("k");

        let report = build(&source, &target, Some(&cipher), &PackageConfig::default()).unwrap();
        assert_eq!(report.files, 3);
        assert_eq!(report.encrypted, 2);

        let entries = list(&target).unwrap();
        let png = entries.iter().find(|e| e.path == "models/icon.png").unwrap();
        let yao = entries.iter().find(|e| e.path == "app.yao").unwrap();
        assert_eq!(png.size, 4);
        assert_ne!(yao.size, "{\"name\": \"demo\"}".len() as u64);
    }

    #[test]
    fn test_build_without_exclusions_keeps_everything() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app");
        fixture(&source);
        let target = temp.path().join("app.yaz");
        let config = PackageConfig::default().with_exclusion(ExclusionPolicy::none());

        let report = build(&source, &target, None, &config).unwrap();
        assert_eq!(report.excluded, 0);
        assert_eq!(report.files, 5);
    }

    #[test]
    fn test_build_skips_target_inside_source() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.json"), "{}").unwrap();
        let target = temp.path().join("self.yaz");

        build(temp.path(), &target, None, &PackageConfig::default()).unwrap();

        let entries = list(&target).unwrap();
        assert!(entries.iter().all(|e| e.path != "self.yaz"));
    }

    #[test]
    fn test_build_new_never_opens_existing_target() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app");
        fixture(&source);
        let target = temp.path().join("app.yaz");
        fs::write(&target, "somebody else's file").unwrap();

        let err = build_new(&source, &target, None, &PackageConfig::default()).unwrap_err();
        assert!(matches!(err, YazError::DestinationExists(ref p) if p == &target));
        assert_eq!(fs::read_to_string(&target).unwrap(), "somebody else's file");

        fs::remove_file(&target).unwrap();
        let report = build_new(&source, &target, None, &PackageConfig::default()).unwrap();
        assert_eq!(report.files, 3);
    }

    #[test]
    fn test_build_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let result = build(
            Path::new("/nonexistent/yaz/source"),
            &temp.path().join("out.yaz"),
            None,
            &PackageConfig::default(),
        );
        assert!(matches!(result, Err(YazError::ReadFailed { .. })));
    }

    #[test]
    fn test_build_leaves_no_scratch_files() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app");
        fixture(&source);
        let scratch_dir = temp.path().join("scratch");
        fs::create_dir_all(&scratch_dir).unwrap();
        let config = PackageConfig::default().with_temp_dir(&scratch_dir);

        build(
            &source,
            &temp.path().join("app.yaz"),
            Some(&KeystreamCipher::new("k")),
            &config,
        )
        .unwrap();

        assert_eq!(fs::read_dir(&scratch_dir).unwrap().count(), 0);
    }
}
