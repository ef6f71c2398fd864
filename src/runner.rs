//! Per-turn driver: session load, agent call, history bookkeeping, save.

use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

use crate::config::AdkConfig;
use crate::error::{AdkError, Result};
use crate::invocation::{InvocationContext, Observer};
use crate::registry::AgentRegistry;
use crate::session::{get_or_create, Session, SessionStore};
use crate::types::Message;

/// Result of one successful turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub session_id: String,
    pub invocation_id: String,
    pub response: Option<Message>,
}

/// Runs turns against agents from an injected registry and session store.
#[derive(Clone)]
pub struct Runner {
    registry: Arc<AgentRegistry>,
    store: Arc<dyn SessionStore>,
    config: AdkConfig,
    observer: Option<Observer>,
}

impl Runner {
    pub fn new(registry: Arc<AgentRegistry>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            registry,
            store,
            config: AdkConfig::default(),
            observer: None,
        }
    }

    pub fn with_config(mut self, config: AdkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn config(&self) -> &AdkConfig {
        &self.config
    }

    /// Run one turn. `session_id` resumes a session owned by `agent_name`;
    /// anything else starts a new one.
    pub async fn run_turn(
        &self,
        agent_name: &str,
        session_id: Option<&str>,
        message: Message,
    ) -> Result<TurnOutcome> {
        self.run_turn_with_cancel(agent_name, session_id, message, CancellationToken::new())
            .await
    }

    /// As [`run_turn`](Self::run_turn), canceled when `cancel` fires.
    ///
    /// On failure the user message is still recorded in the session, unless
    /// the turn was canceled.
    pub async fn run_turn_with_cancel(
        &self,
        agent_name: &str,
        session_id: Option<&str>,
        message: Message,
        cancel: CancellationToken,
    ) -> Result<TurnOutcome> {
        let agent = self.registry.resolve(agent_name)?;
        let mut session = get_or_create(self.store.as_ref(), agent_name, session_id).await?;

        let state = Arc::new(RwLock::new(session.state.clone()));
        let mut ctx = InvocationContext::new()
            .with_cancellation(cancel)
            .with_session_state(state.clone())
            .with_user_content(message.clone())
            .with_debug(self.config.debug);
        if let Some(observer) = &self.observer {
            ctx = ctx.with_observer(observer.clone());
        }

        tracing::debug!(
            agent = agent_name,
            session = %session.id,
            invocation_id = %ctx.invocation_id(),
            history = session.history.len(),
            "running turn"
        );
        let result = agent.process(&ctx, &session.history, message.clone()).await;

        session.state = match state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        match result {
            Ok(response) => {
                session.history.push(message);
                if let Some(response) = &response {
                    session.history.push(response.clone());
                }
                self.finish(&mut session).await?;
                Ok(TurnOutcome {
                    session_id: session.id,
                    invocation_id: ctx.invocation_id().to_string(),
                    response,
                })
            }
            Err(err) if err.is_canceled() => {
                tracing::debug!(session = %session.id, "turn canceled; session left unchanged");
                Err(err)
            }
            Err(err) => {
                tracing::warn!(agent = agent_name, session = %session.id, error = %err, "turn failed");
                session.history.push(message);
                self.finish(&mut session).await?;
                Err(err)
            }
        }
    }

    /// Load a session by id.
    pub async fn session(&self, id: &str) -> Result<Session> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AdkError::SessionNotFound(id.to_string()))
    }

    async fn finish(&self, session: &mut Session) -> Result<()> {
        session.prune(self.config.max_history_turns);
        session.touch();
        self.store.save(session).await
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("observer", &self.observer.as_ref().map(|_| ".."))
            .finish()
    }
}
