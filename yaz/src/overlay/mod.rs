//! Read-only virtual filesystem over an extracted container.
//!
//! # Overview
//!
//! [`YazFs::open`] extracts a container into a private temporary root
//! *without* decrypting it, then serves reads from that root. Eligible files
//! stay encrypted on disk and are decrypted in memory on each
//! [`FileSystem::read`].
//!
//! ```text
//! application.yaz ──uncompress──► /tmp/uncompress-XXXX/   (ciphertext at rest)
//!                                        │
//!                     YazFs { root, cipher, policy }
//!                                        │
//!        walk / read / exists ◄──────────┘   write / remove / watch ──► error
//! ```
//!
//! The extraction root lives until the process or an external cleanup
//! removes it; dropping a [`YazFs`] does not delete it.
//!
//! # Paths
//!
//! Names are resolved against the root by lexical normalization. A name
//! whose `..` components would climb above the root is rejected with
//! [`YazError::PathEscapesRoot`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use yaz::{FileSystem, KeystreamCipher, YazFs};
//!
//! let fs = YazFs::open("app.yaz".as_ref(), Some(Arc::new(KeystreamCipher::new(key))))?;
//! fs.walk("models", &mut |_, name, is_dir| {
//!     if !is_dir {
//!         let source = fs.read(name)?;
//!         // load model ...
//!     }
//!     Ok(())
//! }, Some(&["*.mod.yao"]))?;
//! ```

mod traits;
mod walk;

pub use traits::{FileSystem, WalkVisitor};
pub use walk::MATCH_ALL;

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use tracing::error;

use crate::cipher::Cipher;
use crate::config::PackageConfig;
use crate::error::{YazError, YazResult};
use crate::package::Packager;
use crate::path::{is_hidden, join_components, normalize_relative};
use crate::policy::EncryptionPolicy;
use crate::tree::{walk_preorder, Descend, NodeKind};
use walk::{display_path, NameFilter};

/// Read-only view of one extracted container.
pub struct YazFs {
    root: PathBuf,
    container: Option<PathBuf>,
    cipher: Option<Arc<dyn Cipher>>,
    encryption: EncryptionPolicy,
    walk_patterns: Vec<String>,
}

impl YazFs {
    /// Open a container with the default configuration.
    pub fn open(file: &Path, cipher: Option<Arc<dyn Cipher>>) -> YazResult<Self> {
        Packager::default().open(file, cipher)
    }

    /// Bind an already extracted root with the default configuration.
    pub fn from_root(root: impl Into<PathBuf>, cipher: Option<Arc<dyn Cipher>>) -> YazResult<Self> {
        Self::with_config(root.into(), None, cipher, &PackageConfig::default())
    }

    pub(crate) fn with_config(
        root: PathBuf,
        container: Option<PathBuf>,
        cipher: Option<Arc<dyn Cipher>>,
        config: &PackageConfig,
    ) -> YazResult<Self> {
        let root = std::path::absolute(&root).map_err(|e| YazError::ReadFailed {
            path: root.clone(),
            source: e,
        })?;

        Ok(Self {
            root,
            container,
            cipher,
            encryption: config.encryption.clone(),
            walk_patterns: config.walk_patterns.clone(),
        })
    }

    /// Absolute extraction root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Container this view was opened from, if any.
    pub fn container(&self) -> Option<&Path> {
        self.container.as_deref()
    }

    /// Resolve a root-relative name to an absolute path inside the root.
    pub fn resolve(&self, name: &str) -> YazResult<PathBuf> {
        let parts =
            normalize_relative(name).ok_or_else(|| YazError::PathEscapesRoot(name.to_string()))?;
        Ok(join_components(&self.root, &parts))
    }
}

impl fmt::Debug for YazFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YazFs")
            .field("root", &self.root)
            .field("container", &self.container)
            .field("encrypted", &self.cipher.is_some())
            .finish()
    }
}

impl FileSystem for YazFs {
    fn walk(
        &self,
        root: &str,
        visitor: &mut WalkVisitor<'_>,
        patterns: Option<&[&str]>,
    ) -> YazResult<()> {
        let base = self.resolve(root)?;
        let walk_root = normalize_relative(root)
            .map(|parts| parts.join("/"))
            .unwrap_or_default();
        let filter = match patterns {
            Some(patterns) => NameFilter::new(patterns),
            None => NameFilter::new(&self.walk_patterns),
        };

        let result = walk_preorder(&base, &mut |node| {
            let is_dir = node.kind == NodeKind::Directory;
            if !is_dir {
                let base_name = node
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default();
                if !filter.matches(&base_name) {
                    return Ok(Descend::Into);
                }
            }

            if is_hidden(node.relative) {
                return Ok(Descend::Skip);
            }

            visitor(root, &display_path(&walk_root, node.relative), is_dir)?;
            Ok(Descend::Into)
        });

        if let Err(e) = &result {
            error!(root, path = %base.display(), error = %e, "Walk aborted");
        }
        result
    }

    fn read(&self, name: &str) -> YazResult<Vec<u8>> {
        let path = self.resolve(name)?;

        match &self.cipher {
            Some(cipher) if self.encryption.eligible_path(name) => {
                let file = File::open(&path).map_err(|e| YazError::ReadFailed {
                    path: path.clone(),
                    source: e,
                })?;

                let mut plain = Vec::new();
                cipher
                    .decrypt(&mut BufReader::new(file), &mut plain)
                    .map_err(|e| YazError::Cipher { path, source: e })?;
                Ok(plain)
            }
            _ => fs::read(&path).map_err(|e| YazError::ReadFailed { path, source: e }),
        }
    }

    fn write(&self, name: &str, _content: &[u8]) -> YazResult<()> {
        Err(YazError::ReadOnly {
            operation: "write",
            path: name.to_string(),
        })
    }

    fn remove(&self, name: &str) -> YazResult<()> {
        Err(YazError::ReadOnly {
            operation: "remove",
            path: name.to_string(),
        })
    }

    fn exists(&self, name: &str) -> YazResult<bool> {
        let path = self.resolve(name)?;
        match fs::metadata(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(YazError::ReadFailed { path, source: e }),
        }
    }

    fn watch(&self, _handler: &dyn Fn(&str, &str), _interrupt: Receiver<u8>) -> YazResult<()> {
        Err(YazError::WatchUnsupported)
    }
}
