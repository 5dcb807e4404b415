//! `SessionService` builder and request-level session operations.
//!
//! This ties the layers together: the notary and packer sign and encode,
//! the session crate issues and extracts, and the repository holds the
//! authoritative state. HTTP routing stays outside; each method here is
//! what one handler would call.
//!
//! ```text
//! POST   /sessions                  → login()
//! GET    /sessions/{id}             → authenticate() + get()
//! PATCH  /sessions/{id}             → authenticate() + renew()
//! DELETE /sessions/{id}             → authenticate() + logout()
//! DELETE /sessions/{id}?all=true    → authenticate() + logout_all()
//! ```

use chrono::{TimeDelta, Utc};
use serde::Serialize;
use tessera_notary::{HmacNotary, Notary};
use tessera_packer::{Base64Packer, Packer};
use tessera_session::{
    AccountId, SIGNED_MESSAGE_LEN, SecretKey, Session, SessionError, SessionId,
    SessionRepository, TokenExtractor, extract_id, token_packer,
};

use crate::auth::bearer_token;
use crate::{Authentication, ConfigError, TesseraConfig, TesseraError};

// ---------------------------------------------------------------------------
// SessionPolicy
// ---------------------------------------------------------------------------

/// How long sessions last.
///
/// Both durations are positive, at most [`SessionPolicy::MAX_DURATION_SECS`],
/// and `default_duration <= max_duration`; [`SessionPolicy::new`] refuses
/// anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    default_duration: TimeDelta,
    max_duration: TimeDelta,
}

impl SessionPolicy {
    /// Three days.
    pub const DEFAULT_DURATION_SECS: u64 = 3 * 24 * 60 * 60;

    /// One hundred years. Keeps `now + duration` well inside the range of
    /// a `DateTime<Utc>`.
    pub const MAX_DURATION_SECS: u64 = 100 * 365 * 24 * 60 * 60;

    /// # Errors
    /// [`ConfigError::InvalidDuration`] if either duration is not positive,
    /// is longer than [`MAX_DURATION_SECS`](Self::MAX_DURATION_SECS), or
    /// the default exceeds the maximum.
    pub fn new(default_duration: TimeDelta, max_duration: TimeDelta) -> Result<Self, ConfigError> {
        if default_duration <= TimeDelta::zero() || max_duration <= TimeDelta::zero() {
            return Err(ConfigError::InvalidDuration(
                "session durations must be positive".into(),
            ));
        }
        let limit = TimeDelta::seconds(Self::MAX_DURATION_SECS as i64);
        if max_duration > limit || default_duration > limit {
            return Err(ConfigError::InvalidDuration(format!(
                "session durations must not exceed {limit}"
            )));
        }
        if default_duration > max_duration {
            return Err(ConfigError::InvalidDuration(format!(
                "default duration {default_duration} exceeds max duration {max_duration}"
            )));
        }
        Ok(Self {
            default_duration,
            max_duration,
        })
    }

    /// Lifetime of a session created at login.
    pub fn default_duration(&self) -> TimeDelta {
        self.default_duration
    }

    /// Longest renewal a client may request.
    pub fn max_duration(&self) -> TimeDelta {
        self.max_duration
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        let three_days = TimeDelta::days(3);
        Self {
            default_duration: three_days,
            max_duration: three_days,
        }
    }
}

// ---------------------------------------------------------------------------
// IssuedSession
// ---------------------------------------------------------------------------

/// A session together with the token that currently represents it.
///
/// Serializes flat, the way it goes out in a response body:
/// `{"token": "...", "id": "...", "accountID": 1, "createdAt": ..., "expiresAt": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedSession {
    pub token: String,
    #[serde(flatten)]
    pub session: Session,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring a [`SessionService`].
///
/// # Example
///
/// ```rust
/// use tessera::prelude::*;
///
/// let service = SessionService::builder()
///     .secret_key(SecretKey::generate())
///     .policy(SessionPolicy::default())
///     .build(InMemorySessionRepository::new())
///     .expect("valid configuration");
/// # let _ = service;
/// ```
pub struct SessionServiceBuilder<N = HmacNotary, P = Base64Packer> {
    key: Option<SecretKey>,
    policy: SessionPolicy,
    notary: N,
    packer: P,
}

impl SessionServiceBuilder {
    /// Creates a builder with the HMAC notary, the session token packer and
    /// the default policy. A secret key must still be supplied.
    pub fn new() -> Self {
        Self {
            key: None,
            policy: SessionPolicy::default(),
            notary: HmacNotary::new(),
            packer: token_packer(),
        }
    }

    /// Creates a builder from validated configuration.
    ///
    /// # Errors
    /// Fails if the secret key or the durations are invalid.
    pub fn from_config(config: &TesseraConfig) -> Result<Self, ConfigError> {
        Ok(Self::new()
            .secret_key(config.secret_key()?)
            .policy(config.policy()?))
    }
}

impl Default for SessionServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Notary, P: Packer> SessionServiceBuilder<N, P> {
    /// Sets the key tokens are signed with.
    pub fn secret_key(mut self, key: SecretKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Sets the session duration policy.
    pub fn policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the notary.
    pub fn notary<N2: Notary>(self, notary: N2) -> SessionServiceBuilder<N2, P> {
        SessionServiceBuilder {
            key: self.key,
            policy: self.policy,
            notary,
            packer: self.packer,
        }
    }

    /// Replaces the packer. Its message length must be
    /// [`SIGNED_MESSAGE_LEN`].
    pub fn packer<P2: Packer>(self, packer: P2) -> SessionServiceBuilder<N, P2> {
        SessionServiceBuilder {
            key: self.key,
            policy: self.policy,
            notary: self.notary,
            packer,
        }
    }

    /// Builds the service on top of `repository`.
    ///
    /// # Errors
    /// - [`ConfigError::MissingSecretKey`]: no key was set
    /// - [`ConfigError::PackerLength`]: the packer would split tokens at
    ///   the wrong offset
    pub fn build<R: SessionRepository>(
        self,
        repository: R,
    ) -> Result<SessionService<R, N, P>, TesseraError> {
        let key = self.key.ok_or(ConfigError::MissingSecretKey)?;

        if self.packer.message_len() != SIGNED_MESSAGE_LEN {
            return Err(ConfigError::PackerLength {
                expected: SIGNED_MESSAGE_LEN,
                actual: self.packer.message_len(),
            }
            .into());
        }

        Ok(SessionService {
            repository,
            notary: self.notary,
            packer: self.packer,
            key,
            policy: self.policy,
        })
    }
}

// ---------------------------------------------------------------------------
// SessionService
// ---------------------------------------------------------------------------

/// Issues, authenticates, renews and revokes session tokens.
///
/// Holds no mutable state of its own; share it across request handlers
/// behind an `Arc`. All concurrency lives in the repository.
///
/// Expired sessions are rejected on lookup but never deleted by the
/// service. Sweeping them is the host's job, e.g. a periodic
/// [`InMemorySessionRepository::purge_expired`](tessera_session::InMemorySessionRepository::purge_expired)
/// task or a scheduled `DELETE` against a database-backed repository.
pub struct SessionService<R, N = HmacNotary, P = Base64Packer> {
    repository: R,
    notary: N,
    packer: P,
    key: SecretKey,
    policy: SessionPolicy,
}

impl SessionService<()> {
    /// Creates a new builder.
    pub fn builder() -> SessionServiceBuilder {
        SessionServiceBuilder::new()
    }
}

impl<R, N, P> SessionService<R, N, P>
where
    R: SessionRepository,
    N: Notary,
    P: Packer,
{
    /// Starts a session for an account whose credentials the caller has
    /// already checked, and returns it with its first token.
    pub async fn login(&self, account_id: AccountId) -> Result<IssuedSession, TesseraError> {
        let session = Session::create(account_id, self.policy.default_duration())?;
        self.store(&session).await?;
        let token = self.issue_token(&session)?;

        tracing::info!(session_id = %session.id, %account_id, "session created");
        Ok(IssuedSession { token, session })
    }

    /// Reads the `Authorization` header value and verifies its token.
    ///
    /// Never fails: anything short of a verified token naming a UUID is
    /// [`Authentication::Anonymous`]. The repository is not consulted.
    pub fn authenticate(&self, authorization: Option<&str>) -> Authentication {
        let Some(token) = bearer_token(authorization) else {
            return Authentication::Anonymous;
        };

        match extract_id(token, &self.packer, &self.notary, &self.key) {
            Ok(id) if id.is_uuid() => Authentication::Authenticated(id),
            Ok(id) => {
                tracing::debug!(session_id = %id, "rejected token with non-UUID session id");
                Authentication::Anonymous
            }
            Err(e) => {
                tracing::debug!(error = %e, "rejected bearer token");
                Authentication::Anonymous
            }
        }
    }

    /// Returns the session at `requested`, if the caller's token names it.
    pub async fn get(
        &self,
        auth: &Authentication,
        requested: &SessionId,
    ) -> Result<Session, TesseraError> {
        self.authorize(auth, requested)?;
        self.lookup(requested).await
    }

    /// Extends the session at `requested` to `now + duration` and returns
    /// it with a new token. The old token keeps verifying, but the stored
    /// expiry is what counts.
    ///
    /// # Errors
    /// [`TesseraError::InvalidRenewal`] unless
    /// `0 < duration <= policy.max_duration()`.
    pub async fn renew(
        &self,
        auth: &Authentication,
        requested: &SessionId,
        duration: TimeDelta,
    ) -> Result<IssuedSession, TesseraError> {
        self.authorize(auth, requested)?;

        if duration <= TimeDelta::zero() {
            return Err(TesseraError::InvalidRenewal(format!(
                "expiry must be later than {}",
                Utc::now().to_rfc3339()
            )));
        }
        if duration > self.policy.max_duration() {
            return Err(TesseraError::InvalidRenewal(format!(
                "expiry must not be later than {}",
                (Utc::now() + self.policy.max_duration()).to_rfc3339()
            )));
        }

        let mut session = self.lookup(requested).await?;
        session
            .reset_expires_at(duration)
            .map_err(|e| TesseraError::InvalidRenewal(e.to_string()))?;
        self.store(&session).await?;
        let token = self.issue_token(&session)?;

        tracing::info!(session_id = %session.id, expires_at = %session.expires_at, "session renewed");
        Ok(IssuedSession { token, session })
    }

    /// Deletes the session at `requested`.
    pub async fn logout(
        &self,
        auth: &Authentication,
        requested: &SessionId,
    ) -> Result<(), TesseraError> {
        self.authorize(auth, requested)?;
        let session = self.lookup(requested).await?;

        self.repository
            .delete(&session.id)
            .await
            .map_err(storage_failure)?;

        tracing::info!(session_id = %session.id, "session deleted");
        Ok(())
    }

    /// Deletes every session of the account owning `requested`.
    pub async fn logout_all(
        &self,
        auth: &Authentication,
        requested: &SessionId,
    ) -> Result<(), TesseraError> {
        self.authorize(auth, requested)?;
        let session = self.lookup(requested).await?;

        self.repository
            .delete_all_by_account(session.account_id)
            .await
            .map_err(storage_failure)?;

        tracing::info!(account_id = %session.account_id, "all account sessions deleted");
        Ok(())
    }

    /// Issues the token for `session` with this service's key.
    pub fn issue_token(&self, session: &Session) -> Result<String, TesseraError> {
        Ok(session.token(&self.notary, &self.packer, &self.key)?)
    }

    /// A standalone extractor sharing this service's key, for middleware
    /// that only needs ids.
    pub fn extractor(&self) -> TokenExtractor<P, N>
    where
        P: Clone,
        N: Clone,
    {
        TokenExtractor::new(self.packer.clone(), self.notary.clone(), self.key.clone())
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// The token must name exactly the session being addressed.
    fn authorize(&self, auth: &Authentication, requested: &SessionId) -> Result<(), TesseraError> {
        match auth.session_id() {
            Some(id) if id == requested => Ok(()),
            _ => Err(TesseraError::Unauthorized),
        }
    }

    /// Repository lookup with missing and expired folded into one answer.
    async fn lookup(&self, id: &SessionId) -> Result<Session, TesseraError> {
        match self.repository.find_by_id(id).await {
            Ok(session) => Ok(session),
            Err(SessionError::NotFound(_) | SessionError::Expired(_)) => Err(TesseraError::NotFound),
            Err(e) => Err(storage_failure(e)),
        }
    }

    async fn store(&self, session: &Session) -> Result<(), TesseraError> {
        self.repository
            .save(session)
            .await
            .map_err(storage_failure)
    }
}

fn storage_failure(e: SessionError) -> TesseraError {
    tracing::warn!(error = %e, "session repository failed");
    TesseraError::Session(e)
}
