//! Recovering a session id from a bearer token.
//!
//! This is the reverse of [`Session::token`](crate::Session::token), used by
//! request authentication where no `Session` is at hand yet:
//!
//! ```text
//! token ──unpack──→ (message, signature) ──verify──→ message[..36] ──→ SessionId
//! ```
//!
//! Extraction only proves the token was issued with our key. It does NOT
//! look at the expiry embedded in the message: a token stays verifiable
//! after that time passes and after the session is renewed. Whether the
//! session is still alive is decided afterwards, by a repository lookup
//! against the stored `expires_at`.

use tessera_notary::Notary;
use tessera_packer::Packer;

use crate::{SESSION_ID_LEN, SecretKey, SessionError, SessionId};

/// Unpacks `token`, verifies its signature and returns the session id it
/// carries.
///
/// # Errors
/// - [`SessionError::TokenDecode`]: the packer rejected the token
/// - [`SessionError::TokenVerify`]: the signature doesn't match
/// - [`SessionError::MalformedId`]: the verified message has no usable id
pub fn extract_id<P: Packer, N: Notary>(
    token: &str,
    packer: &P,
    notary: &N,
    key: &SecretKey,
) -> Result<SessionId, SessionError> {
    let (message, signature) =
        packer.unpack(token).map_err(SessionError::TokenDecode)?;

    if !notary.verify(&message, &signature, key.as_bytes()) {
        return Err(SessionError::TokenVerify);
    }

    let id = message
        .get(..SESSION_ID_LEN)
        .ok_or(SessionError::MalformedId)?;
    let id = std::str::from_utf8(id).map_err(|_| SessionError::MalformedId)?;
    Ok(SessionId::from(id))
}

/// Bundles a packer, a notary and the secret key so middleware can extract
/// ids with a single call.
///
/// Holds no mutable state: share one instance (e.g. behind an `Arc`) across
/// all request handlers.
#[derive(Debug, Clone)]
pub struct TokenExtractor<P, N> {
    packer: P,
    notary: N,
    key: SecretKey,
}

impl<P: Packer, N: Notary> TokenExtractor<P, N> {
    pub fn new(packer: P, notary: N, key: SecretKey) -> Self {
        Self {
            packer,
            notary,
            key,
        }
    }

    /// See [`extract_id`].
    pub fn extract(&self, token: &str) -> Result<SessionId, SessionError> {
        extract_id(token, &self.packer, &self.notary, &self.key)
    }
}
