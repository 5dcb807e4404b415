//! Error types for the session layer.

use chrono::TimeDelta;
use tessera_packer::PackerError;

use crate::SessionId;

/// Errors that can occur while issuing tokens, reading them back, or
/// looking sessions up in a repository.
///
/// The variants fall into three groups that callers treat differently:
///
/// - **Shape** (`TokenPack`, `TokenDecode`, `MalformedId`): the bytes were
///   wrong before any cryptography was involved.
/// - **Authenticity** (`TokenVerify`): the signature didn't check out.
///   Callers must not tell the client this apart from "no token at all".
/// - **State** (`NotFound`, `Expired`): the repository's authoritative
///   record says no. Both surface to clients as "not found".
/// - **Range** (`DurationOutOfRange`): a lifetime would push the expiry
///   past the last representable timestamp.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The signed message could not be packed. Only happens when the
    /// session id does not have the length the packer expects.
    #[error("failed to pack session token: {0}")]
    TokenPack(#[source] PackerError),

    /// The token string could not be unpacked.
    #[error("failed to decode session token: {0}")]
    TokenDecode(#[source] PackerError),

    /// The token's signature does not match its message under our key.
    #[error("failed to verify session token")]
    TokenVerify,

    /// The verified message does not start with a UTF-8 session id of
    /// the expected length.
    #[error("session token does not carry a valid session id")]
    MalformedId,

    /// No session with this id exists.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The session exists but its `expires_at` has passed.
    #[error("session {0} expired")]
    Expired(SessionId),

    /// `now + duration` does not fit in a timestamp.
    #[error("session duration {0} is out of range")]
    DurationOutOfRange(TimeDelta),

    /// The backing store failed (connection lost, query error, ...).
    #[error("session storage failed: {0}")]
    Storage(String),
}

/// Errors produced when building a [`SecretKey`](crate::SecretKey).
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The configured key is not valid hex.
    #[error("secret key is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The key has the wrong number of bytes.
    #[error("secret key must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
