//! In-process session store.
//!
//! Keeps every session in a `HashMap` behind a Tokio `RwLock`, plus an
//! index from account to session ids so "log out everywhere" doesn't have
//! to scan the whole map. Both maps are only ever touched under the same
//! write lock, so they can't drift apart.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{AccountId, Session, SessionError, SessionId, SessionRepository};

#[derive(Debug, Default)]
struct Store {
    sessions: HashMap<SessionId, Session>,
    by_account: HashMap<AccountId, HashSet<SessionId>>,
}

impl Store {
    fn remove(&mut self, id: &SessionId) -> Option<Session> {
        let session = self.sessions.remove(id)?;
        if let Some(ids) = self.by_account.get_mut(&session.account_id) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_account.remove(&session.account_id);
            }
        }
        Some(session)
    }
}

/// A [`SessionRepository`] that lives in memory.
///
/// Sessions disappear when the process exits. Expired sessions are kept
/// (and reported as [`SessionError::Expired`]) until deleted or swept by
/// [`purge_expired`](Self::purge_expired).
///
/// ## Lifecycle
///
/// ```text
/// save() ──→ find_by_id() ──→ save() (renewal) ──→ delete()
///                │                                     ↑
///                ▼ (past expires_at)                   │
///            Expired ──────→ purge_expired() ──────────┘
/// ```
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    store: RwLock<Store>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every session whose expiry is before `now`.
    ///
    /// Returns the ids that were removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Vec<SessionId> {
        let mut store = self.store.write().await;

        let expired: Vec<SessionId> = store
            .sessions
            .values()
            .filter(|session| session.is_expired_at(now))
            .map(|session| session.id.clone())
            .collect();

        for id in &expired {
            store.remove(id);
        }

        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "purged expired sessions");
        }
        expired
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.store.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.sessions.is_empty()
    }
}

impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut store = self.store.write().await;

        // An overwrite may in principle move the id to another account;
        // drop the old index entry first so the index stays exact.
        store.remove(&session.id);
        store
            .by_account
            .entry(session.account_id)
            .or_default()
            .insert(session.id.clone());
        store.sessions.insert(session.id.clone(), session.clone());

        tracing::debug!(session_id = %session.id, account_id = %session.account_id, "session saved");
        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Session, SessionError> {
        let store = self.store.read().await;
        let session = store
            .sessions
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;

        if session.is_expired_at(Utc::now()) {
            return Err(SessionError::Expired(id.clone()));
        }
        Ok(session.clone())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        if self.store.write().await.remove(id).is_some() {
            tracing::debug!(session_id = %id, "session deleted");
        }
        Ok(())
    }

    async fn delete_all_by_account(&self, account_id: AccountId) -> Result<(), SessionError> {
        let mut store = self.store.write().await;

        let ids = store.by_account.remove(&account_id).unwrap_or_default();
        for id in &ids {
            store.sessions.remove(id);
        }

        tracing::debug!(%account_id, count = ids.len(), "account sessions deleted");
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
