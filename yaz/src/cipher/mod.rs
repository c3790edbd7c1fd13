//! Cipher capability consumed by the container codec and the overlay.
//!
//! The codec never sees key material or algorithms. It is handed a
//! [`Cipher`] for the duration of one call and pipes payloads through it.
//! Implementations must be symmetric: `decrypt(encrypt(x)) == x` for every
//! byte sequence `x`. Nothing in this crate verifies that.
//!
//! [`KeystreamCipher`] is a keyed reference strategy, useful for tests and
//! for obfuscating source-like files. It does not authenticate payloads.

mod keystream;

pub use keystream::KeystreamCipher;

use std::io::{self, Read, Write};

use thiserror::Error;

/// Errors reported by a [`Cipher`] implementation.
#[derive(Debug, Error)]
pub enum CipherError {
    /// I/O failure on either stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not something this cipher produced.
    #[error("malformed ciphertext: {0}")]
    Malformed(String),

    /// The input was produced with a different key.
    #[error("key mismatch")]
    KeyMismatch,

    /// Implementation-specific failure.
    #[error("cipher backend error: {0}")]
    Backend(String),
}

/// Stream-to-stream encryption strategy.
pub trait Cipher: Send + Sync {
    /// Encrypt everything readable from `reader` into `writer`.
    fn encrypt(&self, reader: &mut dyn Read, writer: &mut dyn Write) -> Result<(), CipherError>;

    /// Decrypt everything readable from `reader` into `writer`.
    fn decrypt(&self, reader: &mut dyn Read, writer: &mut dyn Write) -> Result<(), CipherError>;
}

impl<C: Cipher + ?Sized> Cipher for std::sync::Arc<C> {
    fn encrypt(&self, reader: &mut dyn Read, writer: &mut dyn Write) -> Result<(), CipherError> {
        (**self).encrypt(reader, writer)
    }

    fn decrypt(&self, reader: &mut dyn Read, writer: &mut dyn Write) -> Result<(), CipherError> {
        (**self).decrypt(reader, writer)
    }
}
