use std::collections::{BTreeMap, HashMap};
use std::future::{Future, ready};
use std::pin::Pin;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use super::history::{SessionHistory, Turn};

pub type SessionStoreFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, SessionStoreError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session store backend failed: {0}")]
    Backend(String),
}

/// Storage for per-session turn histories.
///
/// Implementations do not serialize exchanges on the same session; callers
/// that read then append must hold the session's guard from
/// [`super::SessionLocks`].
pub trait SessionStore: Send + Sync {
    /// Returns up to `limit` trailing turns for `session_id`, creating an
    /// empty session when none exists.
    fn open_window<'a>(
        &'a self,
        session_id: &'a str,
        limit: usize,
    ) -> SessionStoreFuture<'a, Vec<Turn>>;

    /// Appends a user/assistant pair, creating the session when absent.
    /// Returns the session's turn count afterwards.
    fn append_exchange<'a>(
        &'a self,
        session_id: &'a str,
        user: Turn,
        assistant: Turn,
    ) -> SessionStoreFuture<'a, usize>;

    /// Deletes the session. Returns `false` when it did not exist.
    fn remove<'a>(&'a self, session_id: &'a str) -> SessionStoreFuture<'a, bool>;

    /// Turn count per session id.
    fn turn_counts(&self) -> SessionStoreFuture<'_, BTreeMap<String, usize>>;
}

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionHistory>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_sessions(&self) -> RwLockReadGuard<'_, HashMap<String, SessionHistory>> {
        match self.sessions.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_sessions(&self) -> RwLockWriteGuard<'_, HashMap<String, SessionHistory>> {
        match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn open_window<'a>(
        &'a self,
        session_id: &'a str,
        limit: usize,
    ) -> SessionStoreFuture<'a, Vec<Turn>> {
        let window = self
            .write_sessions()
            .entry(session_id.to_string())
            .or_default()
            .tail(limit);
        Box::pin(ready(Ok(window)))
    }

    fn append_exchange<'a>(
        &'a self,
        session_id: &'a str,
        user: Turn,
        assistant: Turn,
    ) -> SessionStoreFuture<'a, usize> {
        let turn_count = {
            let mut sessions = self.write_sessions();
            let history = sessions.entry(session_id.to_string()).or_default();
            history.push_exchange(user, assistant);
            history.len()
        };
        Box::pin(ready(Ok(turn_count)))
    }

    fn remove<'a>(&'a self, session_id: &'a str) -> SessionStoreFuture<'a, bool> {
        let removed = self.write_sessions().remove(session_id).is_some();
        Box::pin(ready(Ok(removed)))
    }

    fn turn_counts(&self) -> SessionStoreFuture<'_, BTreeMap<String, usize>> {
        let counts = self
            .read_sessions()
            .iter()
            .map(|(session_id, history)| (session_id.clone(), history.len()))
            .collect();
        Box::pin(ready(Ok(counts)))
    }
}
