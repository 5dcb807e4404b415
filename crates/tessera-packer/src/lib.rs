//! Token packing for Tessera.
//!
//! A "packer" turns a signed message and its signature into a single opaque
//! string that can travel in an HTTP header, and back again:
//!
//! ```text
//! pack:   (message, signature) → message ‖ signature → base64url → "q1Zx…"
//! unpack: "q1Zx…" → base64url⁻¹ → split at mlen → (message, signature)
//! ```
//!
//! There is no length prefix. The message length (`mlen`) is fixed when
//! the packer is constructed and must be the same on the issuing and the
//! verifying side; everything after the first `mlen` bytes is signature.
//!
//! - **Trait** ([`Packer`]): what the session layer depends on.
//! - **Implementation** ([`Base64Packer`]): URL-safe base64.
//! - **Errors** ([`PackerError`]): shape errors only.

mod base64url;
mod error;

pub use base64url::Base64Packer;
pub use error::PackerError;

/// Encodes and decodes a `(message, signature)` pair.
///
/// `Send + Sync + 'static` for the same reason as the notary: one packer
/// is shared by every request-handling task for the life of the process.
pub trait Packer: Send + Sync + 'static {
    /// Concatenates `message` and `signature` and encodes the result.
    ///
    /// # Errors
    /// Returns [`PackerError::LengthMismatch`] if `message` is not exactly
    /// [`message_len`](Self::message_len) bytes.
    fn pack(&self, message: &[u8], signature: &[u8]) -> Result<String, PackerError>;

    /// Decodes `pack` and splits it back into `(message, signature)`.
    ///
    /// # Errors
    /// - [`PackerError::Decode`]: `pack` is not validly encoded
    /// - [`PackerError::Truncated`]: fewer than
    ///   [`message_len`](Self::message_len) bytes after decoding
    fn unpack(&self, pack: &str) -> Result<(Vec<u8>, Vec<u8>), PackerError>;

    /// The fixed message length this packer splits on.
    fn message_len(&self) -> usize;
}
