//! HMAC-SHA-512 notary.

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::Notary;

type HmacSha512 = Hmac<Sha512>;

/// Length in bytes of every signature produced by [`HmacNotary`].
pub const SIGNATURE_LEN: usize = 64;

/// A [`Notary`] backed by HMAC with SHA-512.
///
/// Stateless: the key is passed on every call, so a single instance can
/// serve any number of keys (and any number of threads) at once.
///
/// ```rust
/// use tessera_notary::{HmacNotary, Notary, SIGNATURE_LEN};
///
/// let notary = HmacNotary::new();
/// let sig = notary.sign(b"hello", b"secret");
///
/// assert_eq!(sig.len(), SIGNATURE_LEN);
/// assert!(notary.verify(b"hello", &sig, b"secret"));
/// assert!(!notary.verify(b"hello", &sig, b"other secret"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacNotary;

impl HmacNotary {
    /// Creates a new HMAC notary.
    pub fn new() -> Self {
        Self
    }

    fn mac(message: &[u8], key: &[u8]) -> HmacSha512 {
        // HMAC hashes oversized keys and zero-pads short ones, so every
        // key length is valid here.
        let mut mac = HmacSha512::new_from_slice(key)
            .expect("HMAC can take key of any size");
        mac.update(message);
        mac
    }
}

impl Notary for HmacNotary {
    fn sign(&self, message: &[u8], key: &[u8]) -> Vec<u8> {
        Self::mac(message, key).finalize().into_bytes().to_vec()
    }

    fn verify(&self, message: &[u8], signature: &[u8], key: &[u8]) -> bool {
        // `verify_slice` compares the tags in constant time.
        Self::mac(message, key).verify_slice(signature).is_ok()
    }
}
