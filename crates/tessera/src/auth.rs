//! Request authentication from the `Authorization` header.
//!
//! A request is either [`Authentication::Anonymous`] or
//! [`Authentication::Authenticated`]. There is no third "bad token" state:
//! a token that fails to decode or verify is treated exactly like a missing
//! one, so a client can't probe which tokens were well-formed forgeries.

use tessera_session::SessionId;

const BEARER_PREFIX: &str = "Bearer ";

/// Who the request claims to be, after the cryptographic check only.
///
/// `Authenticated` means the token was signed with our key. It does NOT
/// mean the session is still alive; that takes a repository lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// No token, or a token we could not trust.
    Anonymous,

    /// A verified token naming this session.
    Authenticated(SessionId),
}

impl Authentication {
    /// The session id carried by a verified token, if any.
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Pulls the token out of an `Authorization` header value.
///
/// `Bearer <token>` yields `<token>`. A header without the prefix is taken
/// as the token itself. Missing or blank headers yield `None`.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let header = header?;
    let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}
