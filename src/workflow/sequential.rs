use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::{Agent, AgentKind, AgentNode, SEQUENTIAL_MODEL_ID};
use crate::error::{AdkError, Result, WorkflowStage};
use crate::invocation::{InvocationContext, InvocationEventPayload};
use crate::provider::ModelProvider;
use crate::tools::Tool;
use crate::types::{Message, Role};

/// Runs sub-agents in declaration order. Each response becomes the next input
/// and every step sees the history grown by the steps before it.
pub struct SequentialAgent {
    name: String,
    description: String,
    sub_agents: Vec<Arc<dyn Agent>>,
}

impl SequentialAgent {
    pub fn new(name: impl Into<String>, sub_agents: Vec<Arc<dyn Agent>>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            sub_agents,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn sub_agents(&self) -> &[Arc<dyn Agent>] {
        &self.sub_agents
    }

    pub fn into_arc(self) -> Arc<dyn Agent> {
        Arc::new(self)
    }
}

/// Pipe `message` through `agents`, threading a private copy of `history`.
///
/// Returns the last non-empty response. A missing response is replaced by an
/// empty model message for the next step. Failures are wrapped with the
/// failing child's name and the stage produced by `stage(index)` (1-based).
pub(crate) async fn run_pipeline<F>(
    parent: &str,
    agents: &[Arc<dyn Agent>],
    ctx: &InvocationContext,
    history: &[Message],
    message: Message,
    stage: F,
) -> Result<Option<Message>>
where
    F: Fn(usize) -> WorkflowStage,
{
    let scoped = ctx.for_agent(parent);
    let total = agents.len();
    let mut pipeline_history = history.to_vec();
    let mut current = message;
    let mut last_response = None;

    for (offset, agent) in agents.iter().enumerate() {
        let index = offset + 1;
        scoped.check_canceled()?;
        scoped.emit(InvocationEventPayload::WorkflowStep {
            index,
            total,
            child: agent.name().to_string(),
        });
        tracing::debug!(workflow = parent, child = agent.name(), index, total, "running sub-agent");

        let response = agent
            .process(ctx, &pipeline_history, current.clone())
            .await
            .map_err(|err| AdkError::sub_agent(parent, agent.name(), stage(index), err))?;

        if !current.is_empty() {
            pipeline_history.push(current);
        }
        current = match response {
            Some(response) => {
                pipeline_history.push(response.clone());
                last_response = Some(response.clone());
                response
            }
            None => {
                tracing::debug!(workflow = parent, child = agent.name(), "sub-agent returned no message");
                Message::empty(Role::Model)
            }
        };
    }

    Ok(last_response)
}

#[async_trait]
impl Agent for SequentialAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn model_identifier(&self) -> &str {
        SEQUENTIAL_MODEL_ID
    }

    fn system_instruction(&self) -> Option<&Message> {
        None
    }

    fn tools(&self) -> &[Arc<dyn Tool>] {
        &[]
    }

    fn provider(&self) -> Option<Arc<dyn ModelProvider>> {
        None
    }

    async fn process(
        &self,
        ctx: &InvocationContext,
        history: &[Message],
        message: Message,
    ) -> Result<Option<Message>> {
        if self.sub_agents.is_empty() {
            return Err(AdkError::EmptyWorkflow {
                agent: self.name.clone(),
            });
        }
        let total = self.sub_agents.len();
        run_pipeline(&self.name, &self.sub_agents, ctx, history, message, |index| {
            WorkflowStage::SequentialStep { index, total }
        })
        .await
    }

    fn node(&self) -> AgentNode {
        AgentNode::new(&self.name, AgentKind::Sequential)
            .with_children(self.sub_agents.iter().map(|agent| agent.node()).collect())
    }
}
