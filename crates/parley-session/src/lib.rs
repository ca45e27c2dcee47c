//! Per-session conversation history for the parley voice agent.
//!
//! Sessions are created lazily on first reference and keyed by the opaque
//! identifier the client sends. The store is bounded: it holds at most
//! `capacity` sessions and forgets sessions idle for longer than the
//! configured TTL. Each session's history sits behind its own async mutex so
//! a whole conversational turn can hold it, which serialises concurrent
//! requests for the same session while leaving other sessions unaffected.

use parley_types::{ConversationHistory, Turn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;

type SharedHistory = Arc<tokio::sync::Mutex<ConversationHistory>>;

fn default_capacity() -> usize {
    10_000
}

fn default_idle_ttl_seconds() -> u64 {
    3600
}

fn default_prune_interval_seconds() -> u64 {
    60
}

/// Bounds applied to the session map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of sessions kept. `0` disables the bound.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Sessions untouched for this long are dropped. `0` disables expiry.
    #[serde(default = "default_idle_ttl_seconds")]
    pub idle_ttl_seconds: u64,
    /// How often the background task prunes expired sessions.
    #[serde(default = "default_prune_interval_seconds")]
    pub prune_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            idle_ttl_seconds: default_idle_ttl_seconds(),
            prune_interval_seconds: default_prune_interval_seconds(),
        }
    }
}

impl SessionConfig {
    pub fn idle_ttl(&self) -> Option<Duration> {
        (self.idle_ttl_seconds > 0).then(|| Duration::from_secs(self.idle_ttl_seconds))
    }
}

#[derive(Debug)]
struct SessionEntry {
    history: SharedHistory,
    last_access: Instant,
}

impl SessionEntry {
    /// A session is busy while anyone outside the map holds its history,
    /// either locked or waiting for the lock.
    fn is_busy(&self) -> bool {
        Arc::strong_count(&self.history) > 1
    }

    fn is_expired(&self, now: Instant, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| now.duration_since(self.last_access) > ttl)
    }
}

/// Exclusive access to one session's history.
///
/// Dropping the guard releases the session for the next waiting request.
pub struct SessionGuard {
    session_id: String,
    history: OwnedMutexGuard<ConversationHistory>,
    store: SessionStore,
}

impl SessionGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Appends a turn to the end of the session's history.
    ///
    /// The first turn is what makes a session count against the store's
    /// capacity, so that is when idle sessions may be evicted.
    pub fn append(&mut self, turn: Turn) {
        if self.history.is_empty() {
            self.store.admit(&self.session_id);
        }
        self.history.push(turn);
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn turns(&self) -> &[Turn] {
        self.history.turns()
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("session_id", &self.session_id)
            .field("turns", &self.history.len())
            .finish()
    }
}

/// Process-wide map from session id to conversation history.
///
/// The map itself uses `std::sync::Mutex`: every acquisition is a short
/// HashMap operation that never spans an `.await`.
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
    capacity: usize,
    idle_ttl: Option<Duration>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            capacity: config.capacity,
            idle_ttl: config.idle_ttl(),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // The map holds no invariant a panicking holder could break
                // halfway; keep serving with what is there.
                tracing::error!("session map lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Returns the session's history handle, creating an empty history for an
    /// unseen id. Marks the session as recently used.
    pub fn get_or_create(&self, session_id: &str) -> Arc<tokio::sync::Mutex<ConversationHistory>> {
        self.entry(session_id, true)
    }

    fn entry(&self, session_id: &str, enforce_capacity: bool) -> SharedHistory {
        let now = Instant::now();
        let mut sessions = self.sessions();

        if let Some(entry) = sessions.get_mut(session_id) {
            entry.last_access = now;
            return entry.history.clone();
        }

        let history = SharedHistory::default();
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                history: history.clone(),
                last_access: now,
            },
        );
        tracing::debug!(session_id, sessions = sessions.len(), "created session");

        // The new entry is busy while `history` is alive, so it is never the
        // one evicted here.
        if enforce_capacity {
            self.make_room(&mut sessions, now);
        }
        history
    }

    /// Waits for exclusive access to the session, creating it if needed.
    ///
    /// Requests for the same session are granted in arrival order. A session
    /// created here evicts nothing until its first turn is appended.
    pub async fn lock(&self, session_id: &str) -> SessionGuard {
        let history = self.entry(session_id, false);
        SessionGuard {
            session_id: session_id.to_string(),
            history: history.lock_owned().await,
            store: self.clone(),
        }
    }

    fn admit(&self, session_id: &str) {
        let mut sessions = self.sessions();
        if sessions.contains_key(session_id) {
            self.make_room(&mut sessions, Instant::now());
        }
    }

    /// Removes the session if its history is empty and no request holds or
    /// awaits it. Returns whether it was removed.
    pub fn discard_if_empty(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions();
        let removable = sessions.get(session_id).is_some_and(|entry| {
            !entry.is_busy()
                && entry
                    .history
                    .try_lock()
                    .is_ok_and(|history| history.is_empty())
        });
        if removable {
            sessions.remove(session_id);
            tracing::debug!(session_id, "discarded empty session");
        }
        removable
    }

    /// Appends one turn to the session, creating it if needed.
    pub async fn append(&self, session_id: &str, turn: Turn) {
        self.lock(session_id).await.append(turn);
    }

    /// Returns a copy of the session's history, or `None` for an unknown id.
    ///
    /// Waits for any in-flight turn on that session to finish.
    pub async fn snapshot(&self, session_id: &str) -> Option<ConversationHistory> {
        let history = self.sessions().get(session_id)?.history.clone();
        let snapshot = history.lock().await.clone();
        Some(snapshot)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions().contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    /// Drops every idle session whose last access is older than the TTL and
    /// returns their ids.
    pub fn prune_expired(&self) -> Vec<String> {
        let Some(ttl) = self.idle_ttl else {
            return Vec::new();
        };
        let now = Instant::now();
        let mut sessions = self.sessions();

        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, entry)| !entry.is_busy() && entry.is_expired(now, Some(ttl)))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
        }
        expired
    }

    /// Brings the map back within capacity: expired idle sessions go first,
    /// then the least recently used idle sessions. Busy sessions are never
    /// evicted, so the map may briefly exceed capacity when every session is
    /// in use.
    fn make_room(&self, sessions: &mut HashMap<String, SessionEntry>, now: Instant) {
        if self.capacity == 0 || sessions.len() <= self.capacity {
            return;
        }
        let ttl = self.idle_ttl;
        sessions.retain(|_, entry| entry.is_busy() || !entry.is_expired(now, ttl));

        while sessions.len() > self.capacity {
            if !self.evict_one(sessions) {
                break;
            }
        }
    }

    fn evict_one(&self, sessions: &mut HashMap<String, SessionEntry>) -> bool {
        let victim = sessions
            .iter()
            .filter(|(_, entry)| !entry.is_busy())
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(id, _)| id.clone());

        match victim {
            Some(id) => {
                sessions.remove(&id);
                tracing::debug!(session_id = %id, "evicted least recently used session");
                true
            }
            None => {
                tracing::warn!(
                    capacity = self.capacity,
                    sessions = sessions.len(),
                    "session store over capacity, every session is busy"
                );
                false
            }
        }
    }
}
