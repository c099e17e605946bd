use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Exclusive hold on one session id. Released on drop.
pub type SessionGuard = OwnedMutexGuard<()>;

/// Per-session-id async locks.
///
/// Entries are held weakly, so a session's lock lives only while some
/// exchange holds or waits on it.
#[derive(Clone, Default)]
pub struct SessionLocks {
    entries: Arc<Mutex<HashMap<String, Weak<AsyncMutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, session_id: &str) -> SessionGuard {
        self.lock_for(session_id).lock_owned().await
    }

    /// Number of session ids with a live lock.
    #[cfg(test)]
    fn active(&self) -> usize {
        self.lock_entries()
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    fn lock_for(&self, session_id: &str) -> Arc<AsyncMutex<()>> {
        let mut entries = self.lock_entries();
        entries.retain(|_, entry| entry.strong_count() > 0);

        if let Some(existing) = entries.get(session_id).and_then(Weak::upgrade) {
            return existing;
        }

        let lock = Arc::new(AsyncMutex::new(()));
        entries.insert(session_id.to_string(), Arc::downgrade(&lock));
        lock
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, Weak<AsyncMutex<()>>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
