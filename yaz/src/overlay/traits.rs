//! Filesystem contract consumed by application loaders.

use std::sync::mpsc::Receiver;

use crate::error::YazResult;

/// Visitor called for each node of a walk with `(root, name, is_dir)`.
///
/// `root` is the root argument passed to `walk`, unchanged. `name` is the
/// node's `/`-separated path relative to the filesystem root.
pub type WalkVisitor<'a> = dyn FnMut(&str, &str, bool) -> YazResult<()> + 'a;

/// Application filesystem as seen by model, API and plugin loaders.
///
/// All names are relative to the filesystem root and use `/` separators.
pub trait FileSystem: Send + Sync {
    /// Visit every node under `root` in pre-order.
    ///
    /// `patterns` filters non-directory nodes by base name:
    /// `None` applies the filesystem's defaults, an empty list or a leading
    /// `"-"` disables filtering. Patterns support `*`, `?` and `[...]`
    /// classes; a class is negated with `[!...]` or `[^...]`, and `\` escapes
    /// a metacharacter outside a class.
    fn walk(
        &self,
        root: &str,
        visitor: &mut WalkVisitor<'_>,
        patterns: Option<&[&str]>,
    ) -> YazResult<()>;

    /// Read a whole file.
    fn read(&self, name: &str) -> YazResult<Vec<u8>>;

    /// Write a whole file.
    fn write(&self, name: &str, content: &[u8]) -> YazResult<()>;

    /// Remove a file.
    fn remove(&self, name: &str) -> YazResult<()>;

    /// Whether `name` exists. A missing path is `Ok(false)`, not an error.
    fn exists(&self, name: &str) -> YazResult<bool>;

    /// Call `handler(event, name)` on changes until `interrupt` fires.
    fn watch(&self, handler: &dyn Fn(&str, &str), interrupt: Receiver<u8>) -> YazResult<()>;
}
