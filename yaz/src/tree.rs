//! Pre-order directory walking.
//!
//! Children are visited in byte order of their file names, so two walks over
//! the same tree always produce the same sequence.

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use crate::error::{YazError, YazResult};
use crate::path::relative_display;

/// Kind of node found during a walk. Symlinks are not followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Directory,
    File,
    Other,
}

impl NodeKind {
    fn of(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_dir() {
            NodeKind::Directory
        } else if file_type.is_file() {
            NodeKind::File
        } else {
            NodeKind::Other
        }
    }
}

/// A node handed to the walk visitor.
#[derive(Debug)]
pub(crate) struct TreeNode<'a> {
    /// Absolute (or caller-rooted) filesystem path.
    pub path: &'a Path,
    /// `/`-separated path below the walk root; empty for the root itself.
    pub relative: &'a str,
    pub kind: NodeKind,
    pub metadata: &'a Metadata,
}

/// What the walker should do after visiting a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Descend {
    Into,
    Skip,
}

/// Walk `root` in pre-order, calling `visit` for every node including the root.
///
/// The first error, from storage or from the visitor, stops the walk.
pub(crate) fn walk_preorder<F>(root: &Path, visit: &mut F) -> YazResult<()>
where
    F: FnMut(&TreeNode<'_>) -> YazResult<Descend>,
{
    let metadata = fs::metadata(root).map_err(|e| YazError::ReadFailed {
        path: root.to_path_buf(),
        source: e,
    })?;
    walk_node(root, root, &metadata, visit)
}

fn walk_node<F>(base: &Path, path: &Path, metadata: &Metadata, visit: &mut F) -> YazResult<()>
where
    F: FnMut(&TreeNode<'_>) -> YazResult<Descend>,
{
    let relative = relative_display(base, path).unwrap_or_default();
    let kind = NodeKind::of(metadata);
    let node = TreeNode {
        path,
        relative: &relative,
        kind,
        metadata,
    };

    if visit(&node)? == Descend::Skip || kind != NodeKind::Directory {
        return Ok(());
    }

    for child in sorted_children(path)? {
        let child_metadata = fs::symlink_metadata(&child).map_err(|e| YazError::ReadFailed {
            path: child.clone(),
            source: e,
        })?;
        walk_node(base, &child, &child_metadata, visit)?;
    }

    Ok(())
}

fn sorted_children(dir: &Path) -> YazResult<Vec<PathBuf>> {
    let read_failed = |e| YazError::ReadFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_failed)? {
        children.push(entry.map_err(read_failed)?.path());
    }
    children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(children)
}
