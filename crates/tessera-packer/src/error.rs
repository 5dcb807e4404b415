//! Error types for the packer layer.
//!
//! Each crate in Tessera defines its own error enum. A `PackerError` always
//! means the bytes of a token had the wrong shape; it never says anything
//! about whether the token was authentic.

/// Errors that can occur while packing or unpacking a token.
#[derive(Debug, thiserror::Error)]
pub enum PackerError {
    /// The message handed to `pack` is not exactly the length the packer
    /// was configured with.
    ///
    /// The message length is a deployment-wide constant shared by signer
    /// and verifier, so hitting this is a programming error (for example,
    /// a session id that isn't a 36-character UUID).
    #[error("message length {actual} does not match packer length {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The input was not valid URL-safe base64.
    #[error("decode failed: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The input decoded fine but is too short to hold a whole message.
    #[error("decoded {actual} bytes, need at least {expected}")]
    Truncated { expected: usize, actual: usize },
}
