//! Per-call invocation context: identifiers, cancellation, session state and
//! the diagnostic observer channel.

mod events;

pub use events::{InvocationEvent, InvocationEventPayload};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::AdkError;
use crate::types::{JsonObject, Message};

/// Fire-and-forget sink for invocation events. Never used for control flow.
pub type Observer = Arc<dyn Fn(InvocationEvent) + Send + Sync>;

/// Session key/value state shared with callbacks for the duration of a turn.
pub type SharedState = Arc<RwLock<JsonObject>>;

/// Context threaded through one `process` call tree.
///
/// Cloning is cheap; clones share the cancellation token, the observer and the
/// event sequence counter.
#[derive(Clone)]
pub struct InvocationContext {
    invocation_id: String,
    agent_name: String,
    cancel: CancellationToken,
    observer: Option<Observer>,
    session_state: Option<SharedState>,
    user_content: Option<Message>,
    seq: Arc<AtomicU64>,
    debug: bool,
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationContext {
    /// New context with a fresh invocation id and its own cancellation token.
    pub fn new() -> Self {
        Self {
            invocation_id: Uuid::new_v4().to_string(),
            agent_name: String::new(),
            cancel: CancellationToken::new(),
            observer: None,
            session_state: None,
            user_content: None,
            seq: Arc::new(AtomicU64::new(1)),
            debug: false,
        }
    }

    pub fn with_invocation_id(mut self, id: impl Into<String>) -> Self {
        self.invocation_id = id.into();
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_session_state(mut self, state: SharedState) -> Self {
        self.session_state = Some(state);
        self
    }

    pub fn with_user_content(mut self, message: Message) -> Self {
        self.user_content = Some(message);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Scoped copy for a child agent; identifiers and cancellation are shared.
    pub fn for_agent(&self, agent_name: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.agent_name = agent_name.into();
        child
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn session_state(&self) -> Option<&SharedState> {
        self.session_state.as_ref()
    }

    pub fn user_content(&self) -> Option<&Message> {
        self.user_content.as_ref()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    /// Cancel this invocation and everything sharing its token.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail with [`AdkError::Canceled`] if cancellation has been requested.
    pub fn check_canceled(&self) -> Result<(), AdkError> {
        if self.is_canceled() {
            Err(AdkError::Canceled)
        } else {
            Ok(())
        }
    }

    /// Emit an event to the observer, if any.
    pub fn emit(&self, payload: InvocationEventPayload) {
        if self.debug_enabled() {
            tracing::debug!(
                invocation_id = %self.invocation_id,
                agent = %self.agent_name,
                event = ?payload,
                "adk event"
            );
        }
        let Some(observer) = &self.observer else {
            return;
        };
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        observer(InvocationEvent {
            invocation_id: self.invocation_id.clone(),
            agent_name: self.agent_name.clone(),
            seq,
            timestamp: chrono::Utc::now(),
            payload,
        });
    }

    /// Free-form internal log line.
    pub fn log(&self, message: impl Into<String>) {
        self.emit(InvocationEventPayload::Log {
            message: message.into(),
        });
    }
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("invocation_id", &self.invocation_id)
            .field("agent_name", &self.agent_name)
            .field("canceled", &self.cancel.is_cancelled())
            .field("observer", &self.observer.as_ref().map(|_| ".."))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn child_contexts_share_cancellation_and_sequence() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let root = InvocationContext::new().with_observer(Arc::new(move |event| {
            sink.lock().expect("event lock").push(event);
        }));
        let child = root.for_agent("child");

        root.log("from root");
        child.log("from child");
        root.cancel();

        assert!(child.is_canceled());
        assert!(matches!(child.check_canceled(), Err(AdkError::Canceled)));
        let events = events.lock().expect("event lock");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].seq, 1);
        assert_eq!(events[1].seq, 2);
        assert_eq!(events[1].agent_name, "child");
        assert_eq!(events[0].invocation_id, events[1].invocation_id);
    }

    #[test]
    fn emitting_without_observer_is_a_noop() {
        let ctx = InvocationContext::new();
        ctx.log("nobody listens");
        assert!(ctx.check_canceled().is_ok());
    }

    #[test]
    fn debug_flag_follows_child_contexts() {
        let quiet = InvocationContext::new();
        assert!(!quiet.debug_enabled());

        let verbose = InvocationContext::new().with_debug(true);
        let child = verbose.for_agent("worker");
        assert!(child.debug_enabled());
        // Observers still see every event regardless of the flag.
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = events.clone();
        let observed = child.clone().with_observer(Arc::new(move |event| {
            sink.lock().expect("event lock").push(event);
        }));
        observed.log("traced");
        assert_eq!(events.lock().expect("event lock").len(), 1);
    }
}
