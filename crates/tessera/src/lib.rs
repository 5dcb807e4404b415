//! # Tessera
//!
//! Signed, opaque session tokens for HTTP services.
//!
//! Tessera issues a token when an account logs in, recognises that token on
//! later requests, and lets clients renew or revoke their sessions. Account
//! storage, password checks and HTTP routing belong to the host service;
//! Tessera only needs a [`SessionRepository`](tessera_session::SessionRepository).
//!
//! ## Quick Start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), TesseraError> {
//! let service = SessionService::builder()
//!     .secret_key(SecretKey::generate())
//!     .build(InMemorySessionRepository::new())?;
//!
//! // After the account's password has been checked:
//! let issued = service.login(AccountId(1)).await?;
//!
//! // On a later request:
//! let header = format!("Bearer {}", issued.token);
//! let auth = service.authenticate(Some(&header));
//! let session = service.get(&auth, &issued.session.id).await?;
//! assert_eq!(session.account_id, AccountId(1));
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod error;
mod service;

pub use auth::{Authentication, bearer_token};
pub use config::{CONFIG_PATH_ENV, ConfigError, SessionSettings, TesseraConfig};
pub use error::TesseraError;
pub use service::{IssuedSession, SessionPolicy, SessionService, SessionServiceBuilder};

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber that writes to stderr.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Calling this
/// more than once is harmless; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Everything a host service needs, in one import.
pub mod prelude {
    pub use crate::{
        Authentication, IssuedSession, SessionPolicy, SessionService, SessionServiceBuilder,
        TesseraConfig, TesseraError,
    };
    pub use tessera_notary::{HmacNotary, Notary};
    pub use tessera_packer::{Base64Packer, Packer};
    pub use tessera_session::{
        AccountId, InMemorySessionRepository, SecretKey, Session, SessionError, SessionId,
        SessionRepository, TokenExtractor,
    };
}
