//! Path conventions shared by the codec and the overlay.
//!
//! Every root-relative path produced by this crate is `/`-separated, has no
//! leading separator and no `.` or `..` components.

use std::path::{Component, Path, PathBuf};

/// Extension used for encryption eligibility: the text after the last `.`
/// of the final path component, or `""` when there is none.
///
/// ```
/// assert_eq!(yaz::path::extension_of("apis/user.http.json"), "json");
/// assert_eq!(yaz::path::extension_of("views/page.tmpl.html"), "html");
/// assert_eq!(yaz::path::extension_of("bin/plugin"), "");
/// ```
pub fn extension_of(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(idx) => &base[idx + 1..],
        None => "",
    }
}

/// Lexically normalize a name into root-relative components.
///
/// Leading separators are ignored, `.` is dropped and `..` pops the previous
/// component. Returns `None` when a `..` would climb above the root.
pub fn normalize_relative(name: &str) -> Option<Vec<String>> {
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }
    Some(parts)
}

/// Join normalized components onto `root`.
pub fn join_components(root: &Path, parts: &[String]) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(parts);
    path
}

/// Render `path` below `base` as a `/`-separated relative string.
///
/// Returns `None` when `path` is not under `base`.
pub fn relative_display(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Whether a root-relative path is hidden: its first component starts with a dot.
pub fn is_hidden(relative: &str) -> bool {
    relative
        .split('/')
        .find(|part| !part.is_empty())
        .is_some_and(|first| first.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extension_of_plain_and_compound() {
        assert_eq!(extension_of("models/user.mod.yao"), "yao");
        assert_eq!(extension_of("a/b.c/readme"), "");
        assert_eq!(extension_of(".env"), "env");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(
            normalize_relative("/models/./user.json"),
            Some(vec!["models".to_string(), "user.json".to_string()])
        );
        assert_eq!(
            normalize_relative("models/../apis/a.json"),
            Some(vec!["apis".to_string(), "a.json".to_string()])
        );
        assert_eq!(normalize_relative(""), Some(vec![]));
        assert_eq!(normalize_relative("/"), Some(vec![]));
    }

    #[test]
    fn test_normalize_relative_rejects_escape() {
        assert_eq!(normalize_relative("../etc/passwd"), None);
        assert_eq!(normalize_relative("models/../../secret"), None);
    }

    #[test]
    fn test_relative_display() {
        let base = Path::new("/tmp/root");
        assert_eq!(
            relative_display(base, Path::new("/tmp/root/a/b.json")),
            Some("a/b.json".to_string())
        );
        assert_eq!(relative_display(base, base), Some(String::new()));
        assert_eq!(relative_display(base, Path::new("/tmp/other")), None);
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(".git/config"));
        assert!(is_hidden("/.env"));
        assert!(!is_hidden("models/.keep"));
        assert!(!is_hidden(""));
        assert!(!is_hidden("a.json"));
    }

    proptest! {
        #[test]
        fn prop_normalized_never_contains_parent(name in "[a-z./]{0,24}") {
            if let Some(parts) = normalize_relative(&name) {
                prop_assert!(parts.iter().all(|p| p != ".." && p != "." && !p.is_empty()));
            }
        }
    }
}
