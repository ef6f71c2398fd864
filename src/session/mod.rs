//! Conversation sessions and the store contract used by the runner.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AdkError, Result};
use crate::types::{prune_in_place, push_turn, JsonObject, Message};

/// Free-form key/value state carried by a session.
pub type SessionState = JsonObject;

/// One resumable conversation with a single agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Name of the agent that owns this session.
    pub agent_name: String,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub state: SessionState,
    pub last_update_time: DateTime<Utc>,
}

impl Session {
    /// New empty session with a random id.
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), agent_name)
    }

    pub fn with_id(id: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agent_name: agent_name.into(),
            history: Vec::new(),
            state: SessionState::new(),
            last_update_time: Utc::now(),
        }
    }

    pub fn append_turn(&mut self, request: Message, response: Message) {
        push_turn(&mut self.history, request, response);
    }

    /// Keep at most `max_turns` turns, never leaving an orphaned function response.
    pub fn prune(&mut self, max_turns: usize) {
        prune_in_place(&mut self.history, max_turns);
    }

    pub fn touch(&mut self) {
        self.last_update_time = Utc::now();
    }
}

/// Storage for sessions. Implementations serialize mutation per session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Session>>;

    async fn save(&self, session: &Session) -> Result<()>;

    /// Ids of sessions owned by `agent_name`, most recently updated first.
    async fn list_by_owner(&self, agent_name: &str) -> Result<Vec<String>>;

    /// Fails with [`AdkError::SessionNotFound`] if no such session exists.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Resume `id` if it exists and belongs to `agent_name`; otherwise start (and
/// save) a fresh session.
pub async fn get_or_create(
    store: &dyn SessionStore,
    agent_name: &str,
    id: Option<&str>,
) -> Result<Session> {
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        match store.get(id).await? {
            Some(session) if session.agent_name == agent_name => return Ok(session),
            Some(session) => tracing::warn!(
                session = id,
                owner = %session.agent_name,
                requested = agent_name,
                "session belongs to another agent; starting a new one"
            ),
            None => tracing::debug!(session = id, "session not found; starting a new one"),
        }
    }
    let session = Session::new(agent_name);
    store.save(&session).await?;
    Ok(session)
}

/// Process-local store. Clone the `Arc` it lives in to share it.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn list_by_owner(&self, agent_name: &str) -> Result<Vec<String>> {
        let sessions = self.sessions.read().await;
        let mut owned: Vec<&Session> = sessions
            .values()
            .filter(|session| session.agent_name == agent_name)
            .collect();
        owned.sort_by(|a, b| {
            b.last_update_time
                .cmp(&a.last_update_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(owned.into_iter().map(|session| session.id.clone()).collect())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self.sessions.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(AdkError::SessionNotFound(id.to_string())),
        }
    }
}
