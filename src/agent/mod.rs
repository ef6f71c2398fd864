//! Agent contract shared by leaf and workflow agents.

pub mod engine;
mod llm_agent;

pub use engine::EngineLimits;
pub use llm_agent::LlmAgent;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Result;
use crate::invocation::InvocationContext;
use crate::provider::ModelProvider;
use crate::tools::Tool;
use crate::types::Message;

/// Model identifier reported by a sequential workflow.
pub const SEQUENTIAL_MODEL_ID: &str = "workflow-sequential";
/// Model identifier reported by a loop workflow.
pub const LOOP_MODEL_ID: &str = "workflow-loop";

/// One capability set for every agent, leaf or composite.
///
/// Only [`Agent::process`] carries behaviour. Composite agents answer the
/// descriptive accessors with sentinel values: a synthetic model identifier,
/// no tools and no provider.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn model_identifier(&self) -> &str;

    fn system_instruction(&self) -> Option<&Message>;

    fn tools(&self) -> &[Arc<dyn Tool>];

    fn provider(&self) -> Option<Arc<dyn ModelProvider>>;

    /// Turn `(history, message)` into a final response.
    ///
    /// `history` is never mutated. `Ok(None)` means the agent produced no
    /// message; composites decide how to treat that.
    async fn process(
        &self,
        ctx: &InvocationContext,
        history: &[Message],
        message: Message,
    ) -> Result<Option<Message>>;

    /// Structural description used by graph rendering and diagnostics.
    fn node(&self) -> AgentNode;
}

/// Agent variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentKind {
    Llm,
    Sequential,
    Parallel,
    Loop,
}

impl AgentKind {
    pub fn is_workflow(self) -> bool {
        !matches!(self, Self::Llm)
    }
}

/// Kind tag, tool names and children of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentNode {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AgentNode>,
}

impl AgentNode {
    pub fn new(name: impl Into<String>, kind: AgentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            tools: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_children(mut self, children: Vec<AgentNode>) -> Self {
        self.children = children;
        self
    }

    /// Depth-first pre-order walk. `visit` receives the node and its parent.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a AgentNode, Option<&'a AgentNode>),
    {
        self.walk_from(None, visit);
    }

    fn walk_from<'a, F>(&'a self, parent: Option<&'a AgentNode>, visit: &mut F)
    where
        F: FnMut(&'a AgentNode, Option<&'a AgentNode>),
    {
        visit(self, parent);
        for child in &self.children {
            child.walk_from(Some(self), visit);
        }
    }

    /// Number of agents in this subtree, including `self`.
    pub fn agent_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_, _| count += 1);
        count
    }
}
