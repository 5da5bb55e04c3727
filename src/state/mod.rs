//! Session state layer
//!
//! One `Session` per conversation, held in memory and never persisted.
//! Each session sits behind its own async mutex so turns of the same
//! conversation are serialized while different conversations run in parallel.

use crate::config::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_TTL_SECS};
use crate::memory::{ConversationHistory, ConversationMessage, RecentTitles};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;

pub const SYSTEM_PERSONA: &str =
    "あなたは創造的で親切なアシスタントです。関西弁を使って、相手を元気づける会話をします。";

/// Conversation identity a session is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn anonymous() -> Self {
        Self("anonymous".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mutable state of one conversation
#[derive(Debug, Clone)]
pub struct Session {
    pub history: ConversationHistory,
    pub recent_titles: RecentTitles,
}

impl Session {
    /// A session in its initial form: persona prompt, nothing recommended yet
    pub fn new() -> Self {
        let mut session = Self {
            history: ConversationHistory::new(),
            recent_titles: RecentTitles::default(),
        };
        session.reset();
        session
    }

    /// Restore the initial form. Idempotent.
    pub fn reset(&mut self) {
        self.history.clear();
        self.history
            .add_message(ConversationMessage::system(SYSTEM_PERSONA));
        self.recent_titles.clear();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Trait for session lookup
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session for `key`, creating it in its initial form if absent
    async fn get_or_create(&self, key: &SessionKey) -> SharedSession;

    /// Fetch without creating
    async fn get(&self, key: &SessionKey) -> Option<SharedSession>;

    async fn len(&self) -> usize;
}

struct SessionEntry {
    session: SharedSession,
    last_used: Instant,
}

impl SessionEntry {
    fn is_idle(&self, now: Instant, idle_ttl: Duration) -> bool {
        now.duration_since(self.last_used) >= idle_ttl
    }
}

/// In-memory session store
///
/// Sessions untouched for `idle_ttl` are dropped, and the map never holds more
/// than `max_sessions`: when full, idle sessions go first, then the least
/// recently used one.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionKey, SessionEntry>>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_limits(
            Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
            DEFAULT_MAX_SESSIONS,
        )
    }

    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Drop every idle session. Returns how many were removed.
    pub async fn prune_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let removed = Self::evict_idle(&mut sessions, self.idle_ttl);
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "Pruned idle sessions");
        }
        removed
    }

    fn evict_idle(sessions: &mut HashMap<SessionKey, SessionEntry>, idle_ttl: Duration) -> usize {
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_idle(now, idle_ttl));
        before - sessions.len()
    }

    fn evict_least_recent(sessions: &mut HashMap<SessionKey, SessionEntry>) {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            sessions.remove(&key);
            debug!(session = %key, "Evicted least recently used session");
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, key: &SessionKey) -> SharedSession {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(entry) = sessions.get_mut(key) {
            if !entry.is_idle(now, self.idle_ttl) {
                entry.last_used = now;
                return entry.session.clone();
            }
            sessions.remove(key);
        }

        if sessions.len() >= self.max_sessions {
            Self::evict_idle(&mut sessions, self.idle_ttl);
        }
        while sessions.len() >= self.max_sessions {
            Self::evict_least_recent(&mut sessions);
        }

        let session = Arc::new(Mutex::new(Session::new()));
        sessions.insert(
            key.clone(),
            SessionEntry {
                session: session.clone(),
                last_used: now,
            },
        );
        session
    }

    async fn get(&self, key: &SessionKey) -> Option<SharedSession> {
        let now = Instant::now();
        let sessions = self.sessions.read().await;
        sessions
            .get(key)
            .filter(|entry| !entry.is_idle(now, self.idle_ttl))
            .map(|entry| entry.session.clone())
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
