//! Keyed message signing for Tessera.
//!
//! A "notary" vouches for a message: given a secret key it produces a
//! signature, and later it can tell whether a (message, signature) pair
//! was produced with that same key. Nothing else in Tessera trusts a
//! token until a notary has verified it.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← builds the signed message, asks for a signature
//!     ↕
//! Notary (this crate)    ← signs and verifies raw bytes
//! ```
//!
//! The crate is deliberately tiny: one trait ([`Notary`]) and one real
//! implementation ([`HmacNotary`]). Tests elsewhere in the workspace swap in
//! scripted notaries through the same trait.

mod mac;

pub use mac::{HmacNotary, SIGNATURE_LEN};

use std::sync::Arc;

/// Signs messages with a key and verifies signatures.
///
/// # Trait bounds
///
/// - `Send + Sync` → one notary is shared by every request-handling task.
/// - `'static` → it owns everything it needs and lives as long as the
///   service holding it.
///
/// Implementations are pure: the same `(message, key)` always yields the
/// same signature, and no call mutates shared state.
pub trait Notary: Send + Sync + 'static {
    /// Returns the signature for `message` under `key`.
    ///
    /// Never fails. Any message length and any key length are accepted.
    fn sign(&self, message: &[u8], key: &[u8]) -> Vec<u8>;

    /// Returns `true` if `signature` is what [`sign`](Self::sign) would
    /// produce for `message` under `key`.
    ///
    /// Implementations must compare in constant time.
    fn verify(&self, message: &[u8], signature: &[u8], key: &[u8]) -> bool;
}

impl<N: Notary> Notary for Arc<N> {
    fn sign(&self, message: &[u8], key: &[u8]) -> Vec<u8> {
        (**self).sign(message, key)
    }

    fn verify(&self, message: &[u8], signature: &[u8], key: &[u8]) -> bool {
        (**self).verify(message, signature, key)
    }
}
