//! Configuration for packaging and opening containers.

use std::path::PathBuf;

use crate::policy::{EncryptionPolicy, ExclusionPolicy};

/// File name used for containers written into a fresh temporary directory.
pub const DEFAULT_CONTAINER_NAME: &str = "application.yaz";

/// Name patterns visited by `walk` when the caller supplies none.
pub const DEFAULT_WALK_PATTERNS: &[&str] = &[
    "*.yao", "*.json", "*.jsonc", "*.yaml", "*.so", "*.dll", "*.js", "*.py", "*.ts", "*.wasm",
];

/// Policies and locations used by a [`crate::Packager`].
#[derive(Debug, Clone)]
pub struct PackageConfig {
    /// Paths left out of containers at build time.
    pub exclusion: ExclusionPolicy,

    /// Extensions encrypted at build time and decrypted at read time.
    ///
    /// Must match between the build and read side.
    pub encryption: EncryptionPolicy,

    /// Patterns used by overlay walks when none are supplied.
    pub walk_patterns: Vec<String>,

    /// Parent directory for `pack-*`, `unpack-*` and similar temp directories.
    pub temp_dir: PathBuf,

    /// File name of containers produced by the temp-directory variants.
    pub container_name: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            exclusion: ExclusionPolicy::default(),
            encryption: EncryptionPolicy::default(),
            walk_patterns: DEFAULT_WALK_PATTERNS.iter().map(|p| p.to_string()).collect(),
            temp_dir: std::env::temp_dir(),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
        }
    }
}

impl PackageConfig {
    /// Create a configuration with default policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exclusion policy.
    pub fn with_exclusion(mut self, exclusion: ExclusionPolicy) -> Self {
        self.exclusion = exclusion;
        self
    }

    /// Set the encryption policy.
    pub fn with_encryption(mut self, encryption: EncryptionPolicy) -> Self {
        self.encryption = encryption;
        self
    }

    /// Replace the default walk patterns.
    pub fn with_walk_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.walk_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the parent directory for temporary directories.
    pub fn with_temp_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_dir = path.into();
        self
    }

    /// Set the container file name used by temp-directory variants.
    pub fn with_container_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = name.into();
        self
    }
}
