use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use super::SessionStore;

pub type SessionHandle = Arc<Mutex<SessionStore>>;

struct Entry {
    store: SessionHandle,
    last_access: Instant,
}

impl Entry {
    fn is_idle(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.duration_since(self.last_access) >= idle_timeout
    }
}

/// Owns every live session. The id map lock is only held to look a session
/// up; the per-session async mutex serializes upload events within a session.
///
/// A session ends explicitly or after `idle_timeout` without a lookup.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
        }
    }

    /// Starts a session with an empty store. Idle sessions are swept first.
    pub fn create(&self) -> Uuid {
        self.evict_idle();

        let id = Uuid::new_v4();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Entry {
                    store: Arc::new(Mutex::new(SessionStore::new())),
                    last_access: Instant::now(),
                },
            );
        tracing::info!(session_id = %id, active_sessions = self.len(), "Session started");
        id
    }

    /// Looks a session up and marks it as used. An idle session found here is
    /// discarded and reported as absent.
    pub fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        if sessions
            .get(&id)
            .is_some_and(|entry| entry.is_idle(now, self.idle_timeout))
        {
            sessions.remove(&id);
            tracing::info!(session_id = %id, "Session expired");
            return None;
        }

        let entry = sessions.get_mut(&id)?;
        entry.last_access = now;
        Some(entry.store.clone())
    }

    /// Ends a session, discarding its store. Returns `false` for unknown ids.
    pub fn end(&self, id: Uuid) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            tracing::info!(session_id = %id, "Session ended");
        }
        removed
    }

    /// Drops every session idle for at least the timeout. Returns how many
    /// were dropped.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_idle(now, self.idle_timeout));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Idle sessions evicted");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}

/// Periodically evicts idle sessions for as long as the registry lives.
pub async fn run_eviction(registry: SessionRegistry) {
    let period = (registry.idle_timeout() / 4).max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        registry.evict_idle();
    }
}
