//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;
use yaz::{PackageConfig, Packager};

/// Route library logs to the test harness. Set `RUST_LOG=yaz=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A small application tree covering every policy the packager applies.
///
/// ```text
/// app/
/// ├── app.yao
/// ├── .gitignore          excluded
/// ├── .git/config         excluded
/// ├── data/cache.db       excluded
/// ├── logs/app.log        excluded
/// ├── models/user.mod.yao
/// ├── models/pet.mod.yao
/// ├── apis/user.http.json
/// ├── public/logo.png     stored as-is
/// └── plugins/demo.so     stored as-is
/// ```
pub fn app_fixture(base: &Path) -> PathBuf {
    let root = base.join("app");
    write(&root, "app.yao", b"{\"name\": \"demo\", \"version\": \"1.0.0\"}");
    write(&root, ".gitignore", b"/data\n");
    write(&root, ".git/config", b"[core]\n");
    write(&root, "data/cache.db", b"cache");
    write(&root, "logs/app.log", b"started");
    write(&root, "models/user.mod.yao", b"{\"table\": {\"name\": \"user\"}}");
    write(&root, "models/pet.mod.yao", b"{\"table\": {\"name\": \"pet\"}}");
    write(&root, "apis/user.http.json", b"{\"group\": \"user\"}");
    write(&root, "public/logo.png", &[0x89, b'P', b'N', b'G', 0, 1, 2, 3]);
    write(&root, "plugins/demo.so", &[0x7f, b'E', b'L', b'F', 9, 9]);
    root
}

pub fn write(root: &Path, name: &str, content: &[u8]) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A packager whose temporary directories live under `temp`.
pub fn isolated_packager(temp: &TempDir) -> Packager {
    let scratch = temp.path().join("scratch");
    fs::create_dir_all(&scratch).unwrap();
    Packager::new(PackageConfig::default().with_temp_dir(scratch))
}

/// Every node under `root` keyed by `/`-separated relative path.
/// Directories map to `None`, files to their contents.
pub fn tree_snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    let mut out = BTreeMap::new();
    collect(root, root, &mut out);
    out
}

/// All regular files under `root`, as sorted `/`-separated relative paths.
pub fn files_under(root: &Path) -> Vec<String> {
    tree_snapshot(root)
        .into_iter()
        .filter_map(|(name, content)| content.map(|_| name))
        .collect()
}

fn collect(root: &Path, dir: &Path, out: &mut BTreeMap<String, Option<Vec<u8>>>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let relative: Vec<String> = path
            .strip_prefix(root)
            .unwrap()
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        if path.is_dir() {
            out.insert(relative.join("/"), None);
            collect(root, &path, out);
        } else {
            out.insert(relative.join("/"), Some(fs::read(&path).unwrap()));
        }
    }
}
