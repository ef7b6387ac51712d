// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side sessions created by the OAuth callback.
//!
//! A session holds the signed-in account and the Google access token used
//! for follow-up provider calls. The browser only sees a JWT naming the
//! session ID.

use crate::error::AppError;
use crate::models::Account;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Session lifetime (30 days), matching the session cookie.
pub const SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// An authenticated browser context.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub account: Account,
    /// OAuth provider access token, when the provider issued one
    pub provider_access_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Shared session table.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for a freshly signed-in account.
    pub fn create(
        &self,
        account: Account,
        provider_access_token: Option<String>,
    ) -> Result<Session, AppError> {
        let id = crate::db::unique_id()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Random ID generation failed")))?;
        let now = Utc::now();

        let session = Session {
            id: id.clone(),
            account,
            provider_access_token,
            created_at: now,
            expires_at: now + Duration::seconds(SESSION_TTL_SECS),
        };

        self.sessions.insert(id, session.clone());
        tracing::info!(
            account_id = %session.account.id,
            active_sessions = self.sessions.len(),
            "Session created"
        );
        Ok(session)
    }

    /// Look up a live session. Expired sessions are dropped on access.
    pub fn get(&self, id: &str) -> Option<Session> {
        let now = Utc::now();
        let session = self.sessions.get(id).map(|s| s.clone())?;

        if session.is_expired(now) {
            self.sessions.remove(id);
            tracing::debug!(account_id = %session.account.id, "Expired session removed");
            return None;
        }
        Some(session)
    }

    /// Delete a session. Returns whether it existed.
    pub fn delete(&self, id: &str) -> bool {
        match self.sessions.remove(id) {
            Some((_, session)) => {
                tracing::info!(account_id = %session.account.id, "Session deleted");
                true
            }
            None => false,
        }
    }

    /// Drop all expired sessions. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(now));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Insert a prepared session (tests and fixtures).
    pub fn insert(&self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: "acct-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_create_get_delete() {
        let store = SessionStore::new();
        let session = store.create(account(), Some("tok".to_string())).unwrap();

        let fetched = store.get(&session.id).unwrap();
        assert_eq!(fetched.account, account());
        assert_eq!(fetched.provider_access_token.as_deref(), Some("tok"));

        assert!(store.delete(&session.id));
        assert!(!store.delete(&session.id));
        assert!(store.get(&session.id).is_none());
    }

    #[test]
    fn test_expired_session_is_dropped() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.insert(Session {
            id: "old".to_string(),
            account: account(),
            provider_access_token: None,
            created_at: now - Duration::days(40),
            expires_at: now - Duration::days(10),
        });
        store.create(account(), None).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.purge_expired(), 1);
        assert!(store.get("old").is_none());
        assert_eq!(store.len(), 1);
    }
}
