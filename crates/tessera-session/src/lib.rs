//! Session tokens for Tessera.
//!
//! This crate handles the token side of a login session:
//!
//! 1. **Session entity**: who is logged in and until when ([`Session`])
//! 2. **Issuance**: signing and packing a session into an opaque token
//!    ([`Session::token`])
//! 3. **Extraction**: verifying a bearer token and recovering the session
//!    id it names ([`extract_id`], [`TokenExtractor`])
//! 4. **Storage**: the authoritative record of live sessions
//!    ([`SessionRepository`], [`InMemorySessionRepository`])
//!
//! # Two-phase trust
//!
//! A request is trusted only after two independent checks, in order:
//!
//! ```text
//! bearer token ──extract_id()──→ SessionId ──find_by_id()──→ Session
//!               (was it signed     (does it still exist and is it
//!                with our key?)     within its stored expiry?)
//! ```
//!
//! The expiry embedded in a token is never used to accept or reject it.
//!
//! # How it fits in the stack
//!
//! ```text
//! Service Layer (above)  ← login, renewal, logout, request authentication
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Notary + Packer (below)  ← signing and wire encoding
//! ```

mod error;
mod extract;
mod key;
mod memory;
mod repository;
mod session;

pub use error::{KeyError, SessionError};
pub use extract::{TokenExtractor, extract_id};
pub use key::{SECRET_KEY_LEN, SecretKey};
pub use memory::InMemorySessionRepository;
pub use repository::SessionRepository;
pub use session::{
    AccountId, EXPIRES_AT_LEN, SESSION_ID_LEN, SIGNED_MESSAGE_LEN, Session, SessionId,
    token_packer,
};
