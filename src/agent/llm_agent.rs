use std::sync::Arc;

use async_trait::async_trait;

use super::engine::{self, EngineLimits};
use super::{Agent, AgentKind, AgentNode};
use crate::callbacks::AgentCallbacks;
use crate::error::Result;
use crate::invocation::InvocationContext;
use crate::provider::ModelProvider;
use crate::tools::{Tool, ToolSet};
use crate::types::Message;

/// Leaf agent: talks to a model backend and executes tools.
#[derive(Clone)]
pub struct LlmAgent {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) model_id: String,
    pub(crate) instruction: Option<Message>,
    pub(crate) tools: ToolSet,
    pub(crate) provider: Option<Arc<dyn ModelProvider>>,
    pub(crate) callbacks: AgentCallbacks,
    pub(crate) limits: EngineLimits,
}

impl LlmAgent {
    pub fn new(name: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            model_id: model_id.into(),
            instruction: None,
            tools: ToolSet::default(),
            provider: None,
            callbacks: AgentCallbacks::default(),
            limits: EngineLimits::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the system instruction from plain text.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(Message::system(instruction));
        self
    }

    pub fn with_instruction_message(mut self, instruction: Message) -> Self {
        self.instruction = Some(instruction);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Register a tool. A tool with an already registered name replaces it.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        for tool in tools {
            self.tools.insert(tool);
        }
        self
    }

    pub fn with_callbacks(mut self, callbacks: AgentCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_limits(mut self, limits: EngineLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn tool_set(&self) -> &ToolSet {
        &self.tools
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    pub fn callbacks(&self) -> &AgentCallbacks {
        &self.callbacks
    }

    pub fn into_arc(self) -> Arc<dyn Agent> {
        Arc::new(self)
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn model_identifier(&self) -> &str {
        &self.model_id
    }

    fn system_instruction(&self) -> Option<&Message> {
        self.instruction.as_ref()
    }

    fn tools(&self) -> &[Arc<dyn Tool>] {
        self.tools.tools()
    }

    fn provider(&self) -> Option<Arc<dyn ModelProvider>> {
        self.provider.clone()
    }

    async fn process(
        &self,
        ctx: &InvocationContext,
        history: &[Message],
        message: Message,
    ) -> Result<Option<Message>> {
        engine::run_turn(self, ctx, history, message).await
    }

    fn node(&self) -> AgentNode {
        AgentNode::new(&self.name, AgentKind::Llm).with_tools(self.tools.names())
    }
}

impl std::fmt::Debug for LlmAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAgent")
            .field("name", &self.name)
            .field("model_id", &self.model_id)
            .field("tools", &self.tools)
            .field(
                "provider",
                &self.provider.as_ref().map(|p| p.provider_name().to_string()),
            )
            .field("callbacks", &self.callbacks)
            .field("limits", &self.limits)
            .finish()
    }
}
