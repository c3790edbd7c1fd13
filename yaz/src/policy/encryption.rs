//! Extension-keyed encryption eligibility.

use std::collections::HashSet;

use crate::path::extension_of;

/// Human-readable extensions encrypted by default.
///
/// The `tmpl.*` compounds are part of the set for compatibility with
/// containers produced elsewhere; eligibility only ever looks at the text
/// after the last dot, so they never match on their own.
pub const DEFAULT_ENCRYPTED_EXTENSIONS: &[&str] = &[
    "js",
    "yao",
    "jsonc",
    "json",
    "html",
    "htm",
    "css",
    "txt",
    "md",
    "go",
    "yml",
    "yaml",
    "xml",
    "conf",
    "ini",
    "toml",
    "sql",
    "tpl",
    "tmpl",
    "tmpl.html",
    "tmpl.js",
    "tmpl.css",
    "tmpl.txt",
    "tmpl.yml",
    "tmpl.yaml",
    "tmpl.xml",
    "tmpl.conf",
    "tmpl.ini",
    "tmpl.toml",
    "tmpl.sql",
    "tmpl.tpl",
    "tmpl.tmpl",
    "tmpl.tmpl.html",
    "tmpl.tmpl.js",
    "tmpl.tmpl.css",
    "tmpl.tmpl.txt",
    "tmpl.tmpl.yml",
    "tmpl.tmpl.yaml",
    "tmpl.tmpl.xml",
    "tmpl.tmpl.conf",
    "tmpl.tmpl.ini",
    "tmpl.tmpl.toml",
    "tmpl.tmpl.sql",
    "tmpl.tmpl.tpl",
    "tmpl.tmpl.tmpl",
];

/// Set of extensions whose files are encrypted when a cipher is supplied.
///
/// Comparison is case-sensitive. Binary artifacts (`so`, `dll`, `wasm`, ...)
/// are deliberately absent and always stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionPolicy {
    extensions: HashSet<String>,
}

impl Default for EncryptionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ENCRYPTED_EXTENSIONS.iter().copied())
    }
}

impl EncryptionPolicy {
    /// Create a policy from extension strings (without the leading dot).
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether files with this extension are encrypted.
    pub fn eligible(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    /// Whether the file at `name` is encrypted, judged by its extension.
    pub fn eligible_path(&self, name: &str) -> bool {
        self.eligible(extension_of(name))
    }

    /// Number of extensions in the set.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
