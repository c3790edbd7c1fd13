//! Build and read policies.
//!
//! Both tables are immutable values. The exclusion policy is only consulted
//! while building; the encryption policy is consulted on both sides and must
//! be identical at build and read time, since nothing in the container
//! records which entries were encrypted.

mod encryption;
mod exclusion;

pub use encryption::{EncryptionPolicy, DEFAULT_ENCRYPTED_EXTENSIONS};
pub use exclusion::{ExclusionPolicy, DEFAULT_EXCLUSIONS};
