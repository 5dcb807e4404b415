//! URL-safe base64 packer.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::{Packer, PackerError};

/// URL-safe alphabet. Emits `=` padding, accepts input with or without it.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A [`Packer`] producing URL-safe base64 strings.
///
/// The output only contains `A-Z a-z 0-9 - _ =`, so it can be placed in an
/// `Authorization: Bearer …` header (or a URL) without further escaping.
///
/// ```rust
/// use tessera_packer::{Base64Packer, Packer};
///
/// let packer = Base64Packer::new(5);
/// let token = packer.pack(b"hello", b"signature").unwrap();
///
/// let (message, signature) = packer.unpack(&token).unwrap();
/// assert_eq!(message, b"hello");
/// assert_eq!(signature, b"signature");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base64Packer {
    mlen: usize,
}

impl Base64Packer {
    /// Creates a packer that expects messages of exactly `mlen` bytes.
    pub fn new(mlen: usize) -> Self {
        Self { mlen }
    }
}

impl Packer for Base64Packer {
    fn pack(&self, message: &[u8], signature: &[u8]) -> Result<String, PackerError> {
        if message.len() != self.mlen {
            return Err(PackerError::LengthMismatch {
                expected: self.mlen,
                actual: message.len(),
            });
        }

        let mut raw = Vec::with_capacity(message.len() + signature.len());
        raw.extend_from_slice(message);
        raw.extend_from_slice(signature);
        Ok(TOKEN_ENGINE.encode(raw))
    }

    fn unpack(&self, pack: &str) -> Result<(Vec<u8>, Vec<u8>), PackerError> {
        let mut decoded = TOKEN_ENGINE.decode(pack)?;

        if decoded.len() < self.mlen {
            return Err(PackerError::Truncated {
                expected: self.mlen,
                actual: decoded.len(),
            });
        }

        // `split_off` leaves the message in `decoded` and hands back the
        // tail, so neither half is copied.
        let signature = decoded.split_off(self.mlen);
        Ok((decoded, signature))
    }

    fn message_len(&self) -> usize {
        self.mlen
    }
}
