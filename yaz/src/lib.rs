//! Yaz - application packaging for Yao apps
//!
//! This library bundles an application directory into a single gzip-compressed
//! tar container, encrypting selected source files on the way in, and exposes
//! a container back to application loaders as a read-only filesystem.
//!
//! # Modules
//!
//! - [`package`]: pack, unpack, compress, uncompress and open
//! - [`codec`]: the container format itself
//! - [`cipher`]: the stream cipher seam and the built-in [`KeystreamCipher`]
//! - [`policy`]: which paths are skipped and which files are encrypted
//! - [`overlay`]: the [`FileSystem`] contract and its [`YazFs`] implementation
//!
//! # Example
//!
//! ```
//! use yaz::{Cipher, KeystreamCipher};
//!
//! let cipher = KeystreamCipher::new("secret");
//! let mut sealed = Vec::new();
//! cipher.encrypt(&mut &b"{\"name\": \"demo\"}"[..], &mut sealed).unwrap();
//!
//! let mut opened = Vec::new();
//! cipher.decrypt(&mut &sealed[..], &mut opened).unwrap();
//! assert_eq!(opened, b"{\"name\": \"demo\"}");
//! assert_eq!(yaz::path::extension_of("models/user.mod.yao"), "yao");
//! ```

pub mod cipher;
pub mod codec;
pub mod config;
pub mod error;
pub mod overlay;
pub mod package;
pub mod path;
pub mod policy;

mod tree;

pub use cipher::{Cipher, CipherError, KeystreamCipher};
pub use codec::{BuildReport, Entry, EntryKind, ExtractReport};
pub use config::PackageConfig;
pub use error::{YazError, YazResult};
pub use overlay::{FileSystem, YazFs, MATCH_ALL};
pub use package::{
    compress, compress_to, decrypt, decrypt_bytes, decrypt_file, encrypt, encrypt_bytes,
    encrypt_file, list, open, pack, pack_to, uncompress, uncompress_to, unpack, unpack_to,
    Packager,
};
pub use policy::{EncryptionPolicy, ExclusionPolicy};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
