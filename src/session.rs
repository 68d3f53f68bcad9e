#![cfg(feature = "web")]
//! Per-browser selection state.
//!
//! Every browser gets its own [`Session`] holding the chosen branch and the
//! seller cursor. Sessions live in a [`SessionStore`] owned by the server
//! state and are looked up by the id carried in the session cookie.

use crate::selector::SellerCursor;
use log::debug;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "dashboard_session";

/// Selection state of one browser.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session id (uuid v4)
    pub id: String,

    /// Selected branch; `None` means the first branch of the sheet
    pub branch: Option<String>,

    /// Position in the branch's seller list
    pub cursor: SellerCursor,

    /// When the timer moves this session to the next seller
    pub next_advance_at: Instant,

    /// Time when the session expires
    pub expires_at: Instant,
}

/// Thread-safe session storage with the auto-advance schedule.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    advance_interval: Duration,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(advance_interval: Duration, ttl: Duration) -> Self {
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
            advance_interval,
            ttl,
        }
    }

    pub fn advance_interval(&self) -> Duration {
        self.advance_interval
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the live session for `id`, creating a fresh one when the id is
    /// unknown, expired or absent. Access extends the session's lifetime.
    pub fn resolve(&self, id: Option<&str>, now: Instant) -> Session {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(session) = id.and_then(|id| sessions.get_mut(id)) {
            if session.expires_at > now {
                session.expires_at = now + self.ttl;
                return session.clone();
            }
        }

        let session = Session {
            id: Uuid::new_v4().to_string(),
            branch: None,
            cursor: SellerCursor::default(),
            next_advance_at: now + self.advance_interval,
            expires_at: now + self.ttl,
        };
        debug!("Created session {}", session.id);
        sessions.insert(session.id.clone(), session.clone());
        session
    }

    /// Snapshot of a session, if it exists.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Switches the session to `branch`, starting again at its first seller.
    pub fn select_branch(&self, id: &str, branch: String, now: Instant) -> Option<Session> {
        self.update(id, |session| {
            debug!("Session {} selected branch {}", session.id, branch);
            session.branch = Some(branch);
            session.cursor.reset();
            session.next_advance_at = now + self.advance_interval;
        })
    }

    /// Manual "next seller". `seller_count` is the size of the session's
    /// current seller list.
    pub fn advance(&self, id: &str, seller_count: usize, now: Instant) -> Option<Session> {
        self.update(id, |session| {
            session.cursor.advance(seller_count);
            session.next_advance_at = now + self.advance_interval;
        })
    }

    /// Advances every session whose deadline has passed and re-arms it.
    ///
    /// `seller_count` maps a session's branch to the length of its seller
    /// list. Returns the number of sessions moved.
    pub fn advance_due<F>(&self, now: Instant, seller_count: F) -> usize
    where
        F: Fn(Option<&str>) -> usize,
    {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let mut moved = 0;
        for session in sessions.values_mut() {
            if session.next_advance_at <= now && session.expires_at > now {
                session.cursor.advance(seller_count(session.branch.as_deref()));
                session.next_advance_at = now + self.advance_interval;
                moved += 1;
            }
        }
        moved
    }

    /// Removes expired sessions. Returns how many were dropped.
    pub fn evict_expired(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    fn update(&self, id: &str, apply: impl FnOnce(&mut Session)) -> Option<Session> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let session = sessions.get_mut(id)?;
        apply(session);
        Some(session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(10);
    const TTL: Duration = Duration::from_secs(3600);

    fn store() -> SessionStore {
        SessionStore::new(INTERVAL, TTL)
    }

    #[test]
    fn unknown_id_creates_a_session() {
        let store = store();
        let now = Instant::now();
        let session = store.resolve(Some("nope"), now);

        assert_ne!(session.id, "nope");
        assert_eq!(session.branch, None);
        assert_eq!(session.next_advance_at, now + INTERVAL);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn known_id_is_reused() {
        let store = store();
        let now = Instant::now();
        let first = store.resolve(None, now);
        let again = store.resolve(Some(&first.id), now + Duration::from_secs(1));
        assert_eq!(first.id, again.id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn branch_selection_resets_cursor() {
        let store = store();
        let now = Instant::now();
        let id = store.resolve(None, now).id;
        store.advance(&id, 3, now);

        let session = store.select_branch(&id, "South".into(), now).unwrap();
        assert_eq!(session.branch.as_deref(), Some("South"));
        assert_eq!(session.cursor, SellerCursor::default());
    }

    #[test]
    fn manual_advance_rearms_the_timer() {
        let store = store();
        let start = Instant::now();
        let id = store.resolve(None, start).id;

        let later = start + Duration::from_secs(7);
        let session = store.advance(&id, 2, later).unwrap();
        assert_eq!(session.cursor.position(2), 1);
        assert_eq!(session.next_advance_at, later + INTERVAL);
    }

    #[test]
    fn only_due_sessions_advance() {
        let store = store();
        let start = Instant::now();
        let early = store.resolve(None, start).id;
        let late = store.resolve(None, start + Duration::from_secs(5)).id;

        let moved = store.advance_due(start + INTERVAL, |_| 3);
        assert_eq!(moved, 1);
        assert_eq!(store.get(&early).unwrap().cursor.position(3), 1);
        assert_eq!(store.get(&late).unwrap().cursor.position(3), 0);
    }

    #[test]
    fn timer_wraps_at_the_end_of_the_list() {
        let store = store();
        let mut now = Instant::now();
        let id = store.resolve(None, now).id;
        for _ in 0..2 {
            now += INTERVAL;
            store.advance_due(now, |_| 2);
        }
        assert_eq!(store.get(&id).unwrap().cursor.position(2), 0);
    }

    #[test]
    fn expired_sessions_are_replaced_and_evicted() {
        let store = store();
        let start = Instant::now();
        let old = store.resolve(None, start).id;

        let after = start + TTL + Duration::from_secs(1);
        let fresh = store.resolve(Some(&old), after);
        assert_ne!(fresh.id, old);
        assert_eq!(store.evict_expired(after), 1);
        assert!(store.get(&old).is_none());
    }
}
