//! Concurrency-safe store of all active sessions.
//!
//! The registry is the only shared mutable state in the server:
//! - Maps connection key (remote `SocketAddr`) to [`Session`].
//! - Enforces display-name and color uniqueness atomically.
//! - Hands out the lowest-index free palette color on registration
//!   and releases it on removal.
//!
//! One `Mutex` guards the table. Every method takes the lock, does its
//! work, and releases it before returning; callers that need to touch
//! sockets (broadcast, user listing) get a cloned [`snapshot`] and
//! iterate with the lock already dropped, so a slow peer can never
//! block login or logout for anyone else.
//!
//! [`snapshot`]: SessionRegistry::snapshot

use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};

use indexmap::IndexMap;

use crate::color::{ColorCode, PALETTE};
use crate::error::RegistryError;
use crate::session::{Session, SessionTx, MAX_USERNAME_LEN};

/// Registry of registered (logged-in) sessions, in registration order.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<IndexMap<SocketAddr, Session>>,
}

impl SessionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    /// Atomically validate a login and insert the new session.
    ///
    /// Checks, all under the one lock so concurrent logins cannot race:
    /// - name is non-empty and at most [`MAX_USERNAME_LEN`] characters,
    /// - this connection is not already registered,
    /// - no registered session already uses the name,
    /// - at least one palette color is free.
    ///
    /// On success the session gets the lowest-index unused color and a
    /// clone of the record is returned.
    pub fn register(
        &self,
        peer: SocketAddr,
        username: &str,
        outbound: SessionTx,
    ) -> Result<Session, RegistryError> {
        if username.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(RegistryError::NameTooLong);
        }

        let mut sessions = self.lock();

        if sessions.contains_key(&peer) {
            return Err(RegistryError::AlreadyLoggedIn);
        }
        if sessions.values().any(|s| s.username == username) {
            return Err(RegistryError::DuplicateName);
        }

        let color = Self::free_color(&sessions).ok_or(RegistryError::PaletteExhausted)?;

        let session = Session {
            peer,
            username: username.to_string(),
            color,
            outbound,
        };
        sessions.insert(peer, session.clone());

        Ok(session)
    }

    /// Atomically remove and return the session for `peer`.
    ///
    /// Its color becomes free for the next registration. Calling this
    /// again for the same key just reports [`RegistryError::NotFound`],
    /// which makes disconnect cleanup safe to run twice.
    pub fn unregister(&self, peer: SocketAddr) -> Result<Session, RegistryError> {
        // shift_remove keeps the remaining entries in join order.
        self.lock()
            .shift_remove(&peer)
            .ok_or(RegistryError::NotFound)
    }

    /// Look up the session registered under `peer`, if any.
    ///
    /// Presence here is the single source of truth for "this
    /// connection is logged in".
    pub fn lookup(&self, peer: SocketAddr) -> Result<Session, RegistryError> {
        self.lock().get(&peer).cloned().ok_or(RegistryError::NotFound)
    }

    /// Number of registered sessions.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Clone of all sessions in registration order.
    ///
    /// The lock is released before the snapshot is returned; use this
    /// for broadcasts and listings instead of holding the lock across
    /// socket work.
    pub fn snapshot(&self) -> Vec<Session> {
        self.lock().values().cloned().collect()
    }

    /// Apply a read-only visitor to a consistent snapshot of sessions.
    ///
    /// The visitor runs outside the lock, so it may call back into the
    /// registry without deadlocking.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&Session),
    {
        for session in self.snapshot() {
            visitor(&session);
        }
    }

    /// Lowest-index palette color not used by any current session.
    fn free_color(sessions: &IndexMap<SocketAddr, Session>) -> Option<ColorCode> {
        PALETTE
            .iter()
            .copied()
            .find(|color| !sessions.values().any(|s| s.color == *color))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<SocketAddr, Session>> {
        // A panic while holding the lock can only happen between
        // complete mutations, so the map is still consistent.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
