//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentKind, AgentNode, EngineLimits, LlmAgent};
pub use crate::callbacks::{AgentCallbacks, CallbackContext};
pub use crate::config::AdkConfig;
pub use crate::error::{AdkError, Result};
pub use crate::invocation::{InvocationContext, InvocationEvent, InvocationEventPayload};
pub use crate::provider::{ModelProvider, ModelRequest, ModelResponse};
pub use crate::registry::AgentRegistry;
pub use crate::runner::{Runner, TurnOutcome};
pub use crate::session::{InMemorySessionStore, Session, SessionStore};
pub use crate::tools::{FunctionTool, Tool, ToolArguments, ToolParameters};
pub use crate::types::{FunctionCall, FunctionResponse, Message, Part, Role};
pub use crate::workflow::{LoopAgent, ParallelAgent, SequentialAgent};
