//! SHA-256 counter-mode keystream cipher.
//!
//! Wire layout of a sealed payload:
//!
//! ```text
//! +--------+-----------+-------------+----------------------------+
//! | "YZK1" | nonce(16) | key tag (8) | body XOR keystream(nonce)  |
//! +--------+-----------+-------------+----------------------------+
//! ```
//!
//! Keystream block `i` is `SHA-256(key || nonce || i as u64 LE)`. The key tag
//! lets `decrypt` reject a payload sealed under another key instead of
//! emitting garbage.

use std::fmt;
use std::io::{self, Read, Write};

use rand::Rng;
use sha2::{Digest, Sha256};

use super::{Cipher, CipherError};

const MAGIC: &[u8; 4] = b"YZK1";
const NONCE_LEN: usize = 16;
const TAG_LEN: usize = 8;
const HEADER_LEN: usize = MAGIC.len() + NONCE_LEN + TAG_LEN;
const CHUNK_SIZE: usize = 64 * 1024;

/// Keyed stream cipher for selectively protected files.
///
/// # Example
///
/// ```
/// use yaz::{Cipher, KeystreamCipher};
///
/// let cipher = KeystreamCipher::new("application-key");
/// let mut sealed = Vec::new();
/// cipher.encrypt(&mut &b"{\"name\": \"user\"}"[..], &mut sealed).unwrap();
///
/// let mut opened = Vec::new();
/// cipher.decrypt(&mut sealed.as_slice(), &mut opened).unwrap();
/// assert_eq!(opened, b"{\"name\": \"user\"}");
/// ```
#[derive(Clone)]
pub struct KeystreamCipher {
    key: [u8; 32],
}

impl KeystreamCipher {
    /// Create a cipher keyed from arbitrary bytes.
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: Sha256::digest(key.as_ref()).into(),
        }
    }

    fn key_tag(&self, nonce: &[u8; NONCE_LEN]) -> [u8; TAG_LEN] {
        let digest = Sha256::new()
            .chain_update(b"yaz-key-tag")
            .chain_update(self.key)
            .chain_update(nonce)
            .finalize();
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&digest[..TAG_LEN]);
        tag
    }
}

impl fmt::Debug for KeystreamCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystreamCipher")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Cipher for KeystreamCipher {
    fn encrypt(&self, reader: &mut dyn Read, writer: &mut dyn Write) -> Result<(), CipherError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill(&mut nonce[..]);

        writer.write_all(MAGIC)?;
        writer.write_all(&nonce)?;
        writer.write_all(&self.key_tag(&nonce))?;

        pipe(reader, writer, &mut Keystream::new(&self.key, nonce))
    }

    fn decrypt(&self, reader: &mut dyn Read, writer: &mut dyn Write) -> Result<(), CipherError> {
        let mut header = [0u8; HEADER_LEN];
        reader.read_exact(&mut header).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => CipherError::Malformed("truncated header".to_string()),
            _ => CipherError::Io(e),
        })?;

        if &header[..MAGIC.len()] != MAGIC {
            return Err(CipherError::Malformed("bad magic".to_string()));
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&header[MAGIC.len()..MAGIC.len() + NONCE_LEN]);
        if header[MAGIC.len() + NONCE_LEN..] != self.key_tag(&nonce) {
            return Err(CipherError::KeyMismatch);
        }

        pipe(reader, writer, &mut Keystream::new(&self.key, nonce))
    }
}

struct Keystream<'a> {
    key: &'a [u8; 32],
    nonce: [u8; NONCE_LEN],
    counter: u64,
    block: [u8; 32],
    used: usize,
}

impl<'a> Keystream<'a> {
    fn new(key: &'a [u8; 32], nonce: [u8; NONCE_LEN]) -> Self {
        Self {
            key,
            nonce,
            counter: 0,
            block: [0u8; 32],
            used: 32,
        }
    }

    fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.used == self.block.len() {
                self.refill();
            }
            *byte ^= self.block[self.used];
            self.used += 1;
        }
    }

    fn refill(&mut self) {
        let digest = Sha256::new()
            .chain_update(self.key)
            .chain_update(self.nonce)
            .chain_update(self.counter.to_le_bytes())
            .finalize();
        self.block.copy_from_slice(&digest);
        self.counter += 1;
        self.used = 0;
    }
}

fn pipe(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    keystream: &mut Keystream<'_>,
) -> Result<(), CipherError> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        keystream.apply(&mut buffer[..n]);
        writer.write_all(&buffer[..n])?;
    }
    writer.flush()?;
    Ok(())
}
