//! The deployment-wide signing key.

use std::fmt;

use rand::Rng;

use crate::KeyError;

/// Length in bytes of a [`SecretKey`] (128 bits).
pub const SECRET_KEY_LEN: usize = 16;

/// Symmetric key used to sign and verify session tokens.
///
/// Exactly [`SECRET_KEY_LEN`] bytes, enforced at construction, so code
/// holding a `SecretKey` never has to re-check the length. The key is
/// read-only once built; share it by cloning or behind an `Arc`.
///
/// `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; SECRET_KEY_LEN]);

impl SecretKey {
    /// Wraps raw key bytes.
    pub fn new(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a hex-encoded key, as it appears in configuration files.
    ///
    /// # Errors
    /// - [`KeyError::InvalidHex`]: not hex
    /// - [`KeyError::InvalidLength`]: decodes to anything but 16 bytes
    pub fn from_hex(encoded: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(encoded.trim())?;
        Self::try_from(bytes.as_slice())
    }

    /// Generates a fresh key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        Self(rng.random())
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hex encoding of the key, suitable for writing back into a config file.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = KeyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let key: [u8; SECRET_KEY_LEN] =
            bytes.try_into().map_err(|_| KeyError::InvalidLength {
                expected: SECRET_KEY_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(key))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_valid_key_succeeds() {
        let key = SecretKey::from_hex("000102030405060708090a0b0c0d0e0f")
            .expect("valid key");
        assert_eq!(key.as_bytes(), (0u8..16).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_from_hex_surrounding_whitespace_is_ignored() {
        let key = SecretKey::from_hex("  00000000000000000000000000000000\n");
        assert!(key.is_ok());
    }

    #[test]
    fn test_from_hex_short_key_returns_invalid_length() {
        let result = SecretKey::from_hex("00112233");
        assert!(matches!(
            result,
            Err(KeyError::InvalidLength { expected: 16, actual: 4 })
        ));
    }

    #[test]
    fn test_from_hex_long_key_returns_invalid_length() {
        let result = SecretKey::from_hex(&"ab".repeat(32));
        assert!(matches!(
            result,
            Err(KeyError::InvalidLength { expected: 16, actual: 32 })
        ));
    }

    #[test]
    fn test_from_hex_not_hex_returns_invalid_hex() {
        let result = SecretKey::from_hex("secret_key_not_hex_at_all_000000");
        assert!(matches!(result, Err(KeyError::InvalidHex(_))));
    }

    #[test]
    fn test_generate_keys_differ() {
        assert_ne!(SecretKey::generate(), SecretKey::generate());
    }

    #[test]
    fn test_to_hex_round_trips_through_from_hex() {
        let key = SecretKey::generate();
        assert_eq!(SecretKey::from_hex(&key.to_hex()).unwrap(), key);
    }

    #[test]
    fn test_debug_does_not_leak_key_bytes() {
        let key = SecretKey::new([0xab; SECRET_KEY_LEN]);
        let printed = format!("{key:?}");
        assert_eq!(printed, "SecretKey(..)");
    }
}
