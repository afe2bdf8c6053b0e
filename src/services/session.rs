// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user session state.
//!
//! A session is opened when a user signs in (or on their first authenticated
//! request) and closed when they sign out or their access token expires. It
//! owns the user's cached record collection; the mutex serializes that
//! user's record operations.

use crate::services::records::RecordCollection;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Minimum time between sweeps for expired sessions, in seconds.
const PRUNE_INTERVAL_SECS: i64 = 60;

/// Shared handle to one user's record collection.
pub type SessionHandle = Arc<Mutex<RecordCollection>>;

struct SessionEntry {
    handle: SessionHandle,
    /// Unix time after which no token seen for this user is valid
    expires_at: i64,
}

/// Open sessions keyed by user ID.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, SessionEntry>>,
    last_prune: Arc<AtomicI64>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's session, opened on first use. `expires_at` is the expiry
    /// of the token the caller presented; a later expiry extends the session.
    pub fn open(&self, user_id: Uuid, expires_at: i64) -> SessionHandle {
        self.open_at(user_id, expires_at, chrono::Utc::now().timestamp())
    }

    fn open_at(&self, user_id: Uuid, expires_at: i64, now: i64) -> SessionHandle {
        // Sweep before taking the entry: retain would deadlock on its shard.
        let last = self.last_prune.load(Ordering::Relaxed);
        if now - last >= PRUNE_INTERVAL_SECS
            && self
                .last_prune
                .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
        {
            self.prune_expired(now);
        }

        let mut entry = self.sessions.entry(user_id).or_insert_with(|| {
            tracing::debug!(user_id = %user_id, "Session opened");
            SessionEntry {
                handle: Arc::new(Mutex::new(RecordCollection::new(user_id))),
                expires_at,
            }
        });
        entry.expires_at = entry.expires_at.max(expires_at);
        entry.handle.clone()
    }

    /// Drop every session whose token has expired. Returns how many.
    pub fn prune_expired(&self, now: i64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        let pruned = before.saturating_sub(self.sessions.len());
        if pruned > 0 {
            tracing::debug!(pruned, "Expired sessions dropped");
        }
        pruned
    }

    pub fn get(&self, user_id: Uuid) -> Option<SessionHandle> {
        self.sessions.get(&user_id).map(|s| s.handle.clone())
    }

    /// Tear down the user's session. Returns whether one was open.
    pub fn close(&self, user_id: Uuid) -> bool {
        let closed = self.sessions.remove(&user_id).is_some();
        if closed {
            tracing::debug!(user_id = %user_id, "Session closed");
        }
        closed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_returns_the_same_session() {
        let registry = SessionRegistry::new();
        let user_id = Uuid::new_v4();

        let first = registry.open_at(user_id, 1_000, 0);
        let second = registry.open_at(user_id, 1_000, 10);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.lock().await.owner(), user_id);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_close_discards_session() {
        let registry = SessionRegistry::new();
        let user_id = Uuid::new_v4();

        registry.open_at(user_id, 1_000, 0);
        assert!(registry.close(user_id));
        assert!(registry.get(user_id).is_none());
        assert!(!registry.close(user_id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_expired_sessions_are_dropped_on_later_open() {
        let registry = SessionRegistry::new();
        let stale = Uuid::new_v4();
        let active = Uuid::new_v4();

        registry.open_at(stale, 100, 0);
        registry.open_at(active, 10_000, 50);
        // Within the sweep interval nothing is dropped yet
        assert!(registry.get(stale).is_some());

        registry.open_at(active, 10_000, 200);
        assert!(registry.get(stale).is_none());
        assert!(registry.get(active).is_some());
    }

    #[test]
    fn test_newer_token_extends_session() {
        let registry = SessionRegistry::new();
        let user_id = Uuid::new_v4();

        registry.open_at(user_id, 100, 0);
        registry.open_at(user_id, 5_000, 90);
        assert_eq!(registry.prune_expired(1_000), 0);
        assert!(registry.get(user_id).is_some());

        assert_eq!(registry.prune_expired(5_000), 1);
        assert!(registry.is_empty());
    }
}
