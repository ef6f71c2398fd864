//! Optional interception points around agent, model and tool execution.
//!
//! Every hook returns `Option<_>`: `None` leaves the data in flight untouched,
//! `Some` overrides it. Hooks are never required.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::invocation::{InvocationContext, SharedState};
use crate::provider::{ModelRequest, ModelResponse};
use crate::tools::Tool;
use crate::types::{JsonObject, Message};

/// Boxed future returned by hooks.
pub type HookFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Data available to every hook.
#[derive(Clone)]
pub struct CallbackContext {
    pub agent_name: String,
    pub invocation_id: String,
    pub session_state: Option<SharedState>,
    pub user_content: Message,
}

impl CallbackContext {
    pub fn new(ctx: &InvocationContext, agent_name: &str, user_content: &Message) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            invocation_id: ctx.invocation_id().to_string(),
            session_state: ctx.session_state().cloned(),
            user_content: user_content.clone(),
        }
    }

    /// Read a session state value, if a session is attached.
    pub fn state_value(&self, key: &str) -> Option<serde_json::Value> {
        let state = self.session_state.as_ref()?;
        let guard = state.read().ok()?;
        guard.get(key).cloned()
    }

    /// Write a session state value. Returns `false` when no session is attached.
    pub fn set_state_value(&self, key: impl Into<String>, value: serde_json::Value) -> bool {
        let Some(state) = self.session_state.as_ref() else {
            return false;
        };
        match state.write() {
            Ok(mut guard) => {
                guard.insert(key.into(), value);
                true
            }
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for CallbackContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackContext")
            .field("agent_name", &self.agent_name)
            .field("invocation_id", &self.invocation_id)
            .field("has_session_state", &self.session_state.is_some())
            .finish()
    }
}

/// Runs once before the loop; `Some` skips the whole loop.
pub type BeforeAgentCallback =
    Arc<dyn Fn(CallbackContext) -> HookFuture<Option<Message>> + Send + Sync>;

/// Runs on the final answer, or with `None` when the round cap is hit.
pub type AfterAgentCallback =
    Arc<dyn Fn(CallbackContext, Option<Message>) -> HookFuture<Option<Message>> + Send + Sync>;

/// Runs before each backend call; `Some` replaces the call.
pub type BeforeModelCallback =
    Arc<dyn Fn(CallbackContext, ModelRequest) -> HookFuture<Option<ModelResponse>> + Send + Sync>;

/// Runs after each backend call; `Some` rewrites the response.
pub type AfterModelCallback =
    Arc<dyn Fn(CallbackContext, ModelResponse) -> HookFuture<Option<ModelResponse>> + Send + Sync>;

/// Runs before a tool executes; `Some` rewrites the arguments.
pub type BeforeToolCallback = Arc<
    dyn Fn(CallbackContext, Arc<dyn Tool>, JsonObject) -> HookFuture<Option<JsonObject>>
        + Send
        + Sync,
>;

/// Runs after a tool succeeds; `Some` rewrites the result object.
pub type AfterToolCallback = Arc<
    dyn Fn(CallbackContext, Arc<dyn Tool>, JsonObject, JsonObject) -> HookFuture<Option<JsonObject>>
        + Send
        + Sync,
>;

/// The six optional hooks of an LLM agent.
#[derive(Clone, Default)]
pub struct AgentCallbacks {
    pub before_agent: Option<BeforeAgentCallback>,
    pub after_agent: Option<AfterAgentCallback>,
    pub before_model: Option<BeforeModelCallback>,
    pub after_model: Option<AfterModelCallback>,
    pub before_tool: Option<BeforeToolCallback>,
    pub after_tool: Option<AfterToolCallback>,
}

impl AgentCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_before_agent<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(CallbackContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<Message>> + Send + 'static,
    {
        self.before_agent = Some(Arc::new(move |ctx| Box::pin(hook(ctx))));
        self
    }

    pub fn with_after_agent<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(CallbackContext, Option<Message>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<Message>> + Send + 'static,
    {
        self.after_agent = Some(Arc::new(move |ctx, response| Box::pin(hook(ctx, response))));
        self
    }

    pub fn with_before_model<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(CallbackContext, ModelRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<ModelResponse>> + Send + 'static,
    {
        self.before_model = Some(Arc::new(move |ctx, request| Box::pin(hook(ctx, request))));
        self
    }

    pub fn with_after_model<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(CallbackContext, ModelResponse) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<ModelResponse>> + Send + 'static,
    {
        self.after_model = Some(Arc::new(move |ctx, response| Box::pin(hook(ctx, response))));
        self
    }

    pub fn with_before_tool<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(CallbackContext, Arc<dyn Tool>, JsonObject) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<JsonObject>> + Send + 'static,
    {
        self.before_tool = Some(Arc::new(move |ctx, tool, args| Box::pin(hook(ctx, tool, args))));
        self
    }

    pub fn with_after_tool<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(CallbackContext, Arc<dyn Tool>, JsonObject, JsonObject) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<JsonObject>> + Send + 'static,
    {
        self.after_tool = Some(Arc::new(move |ctx, tool, args, result| {
            Box::pin(hook(ctx, tool, args, result))
        }));
        self
    }
}

impl std::fmt::Debug for AgentCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentCallbacks")
            .field("before_agent", &self.before_agent.is_some())
            .field("after_agent", &self.after_agent.is_some())
            .field("before_model", &self.before_model.is_some())
            .field("after_model", &self.after_model.is_some())
            .field("before_tool", &self.before_tool.is_some())
            .field("after_tool", &self.after_tool.is_some())
            .finish()
    }
}
