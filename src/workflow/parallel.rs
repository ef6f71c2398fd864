use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::agent::{Agent, AgentKind, AgentNode};
use crate::error::{AdkError, Result, WorkflowStage};
use crate::invocation::{InvocationContext, InvocationEventPayload};
use crate::provider::{ModelProvider, ModelRequest};
use crate::tools::Tool;
use crate::types::{Message, Part};

/// Fans the same input out to every sub-agent concurrently, then asks its own
/// model to combine their text answers.
pub struct ParallelAgent {
    name: String,
    description: String,
    model_id: String,
    instruction: Option<Message>,
    provider: Option<Arc<dyn ModelProvider>>,
    sub_agents: Vec<Arc<dyn Agent>>,
}

impl ParallelAgent {
    pub fn new(
        name: impl Into<String>,
        model_id: impl Into<String>,
        sub_agents: Vec<Arc<dyn Agent>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            model_id: model_id.into(),
            instruction: None,
            provider: None,
            sub_agents,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(Message::system(instruction));
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn sub_agents(&self) -> &[Arc<dyn Agent>] {
        &self.sub_agents
    }

    pub fn into_arc(self) -> Arc<dyn Agent> {
        Arc::new(self)
    }

    async fn synthesize(
        &self,
        ctx: &InvocationContext,
        provider: &Arc<dyn ModelProvider>,
        branches: &[Option<Message>],
    ) -> Result<Message> {
        let mut texts = Vec::new();
        for response in branches.iter().flatten() {
            for part in &response.parts {
                match part {
                    Part::Text(text) => texts.push(text.as_str()),
                    other => tracing::debug!(
                        workflow = %self.name,
                        part = ?other,
                        "non-text part dropped from synthesis"
                    ),
                }
            }
        }

        ctx.emit(InvocationEventPayload::Synthesizing {
            branches: branches.len(),
        });
        ctx.check_canceled()?;

        let request = ModelRequest {
            model_id: self.model_id.clone(),
            system_instruction: self.instruction.clone(),
            tools: Vec::new(),
            history: Vec::new(),
            latest_message: Message::user(synthesis_prompt(&texts)),
        };
        let response = tokio::select! {
            biased;
            _ = ctx.cancellation_token().cancelled() => return Err(AdkError::Canceled),
            result = provider.generate_content(&request) => result.map_err(|err| match err {
                AdkError::Canceled => AdkError::Canceled,
                other => AdkError::backend(&self.name, other),
            })?,
        };
        response.content.ok_or_else(|| AdkError::EmptyResponse {
            agent: self.name.clone(),
        })
    }
}

/// Prompt asking the model to merge concurrently gathered answers.
pub fn synthesis_prompt(texts: &[&str]) -> String {
    format!(
        "The following information was gathered concurrently:\n\n---\n{}\n---\n\nBased on this information, provide a comprehensive summary to the user.",
        texts.join("\n---\n")
    )
}

#[async_trait]
impl Agent for ParallelAgent {
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
        &[]
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
        if self.sub_agents.is_empty() {
            return Err(AdkError::EmptyWorkflow {
                agent: self.name.clone(),
            });
        }
        let Some(provider) = self.provider.clone() else {
            return Err(AdkError::Configuration(format!(
                "agent '{}' has no LLM provider configured",
                self.name
            )));
        };

        let scoped = ctx.for_agent(&self.name);
        scoped.check_canceled()?;
        tracing::debug!(workflow = %self.name, branches = self.sub_agents.len(), "fanning out");

        let branches = self.sub_agents.iter().enumerate().map(|(index, agent)| {
            scoped.emit(InvocationEventPayload::ParallelBranchStarted {
                child: agent.name().to_string(),
            });
            let message = message.clone();
            async move {
                agent.process(ctx, history, message).await.map_err(|err| {
                    AdkError::sub_agent(
                        &self.name,
                        agent.name(),
                        WorkflowStage::ParallelBranch { index: index + 1 },
                        err,
                    )
                })
            }
        });

        let results = tokio::select! {
            biased;
            _ = ctx.cancellation_token().cancelled() => return Err(AdkError::Canceled),
            results = try_join_all(branches) => results?,
        };

        self.synthesize(&scoped, &provider, &results).await.map(Some)
    }

    fn node(&self) -> AgentNode {
        AgentNode::new(&self.name, AgentKind::Parallel)
            .with_children(self.sub_agents.iter().map(|agent| agent.node()).collect())
    }
}
