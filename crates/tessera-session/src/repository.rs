//! Storage hook for sessions.
//!
//! Tessera doesn't care where sessions live (Postgres, Redis, memory).
//! It defines the [`SessionRepository`] trait and the service layer calls
//! it; [`InMemorySessionRepository`](crate::InMemorySessionRepository) is
//! the bundled implementation for tests and single-process deployments.
//!
//! The repository is the authoritative half of token validation: a token
//! only proves it was signed by us, while `find_by_id` decides whether the
//! session it names still exists and is still within its expiry.

use std::future::Future;

use crate::{AccountId, Session, SessionError, SessionId};

/// Durable store of sessions keyed by [`SessionId`].
///
/// # Trait bounds
///
/// - `Send + Sync` → request handlers on any Tokio worker share one
///   repository.
/// - `'static` → the repository lives as long as the service.
///
/// # Example
///
/// ```rust
/// use tessera_session::{AccountId, Session, SessionError, SessionId, SessionRepository};
///
/// /// A store that never has anything in it.
/// struct EmptyRepository;
///
/// impl SessionRepository for EmptyRepository {
///     async fn save(&self, _session: &Session) -> Result<(), SessionError> {
///         Err(SessionError::Storage("read-only".into()))
///     }
///
///     async fn find_by_id(&self, id: &SessionId) -> Result<Session, SessionError> {
///         Err(SessionError::NotFound(id.clone()))
///     }
///
///     async fn delete(&self, _id: &SessionId) -> Result<(), SessionError> {
///         Ok(())
///     }
///
///     async fn delete_all_by_account(&self, _account_id: AccountId) -> Result<(), SessionError> {
///         Ok(())
///     }
/// }
/// ```
pub trait SessionRepository: Send + Sync + 'static {
    /// Inserts the session, or overwrites the stored one with the same id.
    ///
    /// # Errors
    /// [`SessionError::Storage`] if the backend fails.
    fn save(
        &self,
        session: &Session,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Looks a session up by id.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`]: no such session
    /// - [`SessionError::Expired`]: found, but `expires_at` has passed
    /// - [`SessionError::Storage`]: the backend failed
    fn find_by_id(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<Session, SessionError>> + Send;

    /// Removes a session. Removing an unknown id is not an error.
    fn delete(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Removes every session belonging to `account_id`.
    fn delete_all_by_account(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;
}
