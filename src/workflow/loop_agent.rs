use std::sync::Arc;

use async_trait::async_trait;

use super::sequential::run_pipeline;
use crate::agent::{Agent, AgentKind, AgentNode, LOOP_MODEL_ID};
use crate::error::{AdkError, Result, WorkflowStage};
use crate::invocation::{InvocationContext, InvocationEventPayload};
use crate::provider::ModelProvider;
use crate::tools::Tool;
use crate::types::Message;

/// Decides, from the latest response, whether a loop should stop early.
pub type StopCondition = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// Repeats its sub-agents, feeding each iteration's response into the next.
///
/// Running out of iterations is not an error: the last response is returned.
pub struct LoopAgent {
    name: String,
    description: String,
    sub_agents: Vec<Arc<dyn Agent>>,
    max_iterations: usize,
    stop_condition: StopCondition,
}

impl LoopAgent {
    pub fn new(name: impl Into<String>, sub_agent: Arc<dyn Agent>, max_iterations: usize) -> Self {
        Self::over_sequence(name, vec![sub_agent], max_iterations)
    }

    /// Each iteration runs `sub_agents` as a sequential pipeline.
    pub fn over_sequence(
        name: impl Into<String>,
        sub_agents: Vec<Arc<dyn Agent>>,
        max_iterations: usize,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            sub_agents,
            max_iterations,
            stop_condition: Arc::new(|_| false),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_stop_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        self.stop_condition = Arc::new(condition);
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn sub_agents(&self) -> &[Arc<dyn Agent>] {
        &self.sub_agents
    }

    pub fn into_arc(self) -> Arc<dyn Agent> {
        Arc::new(self)
    }
}

#[async_trait]
impl Agent for LoopAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn model_identifier(&self) -> &str {
        LOOP_MODEL_ID
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

        let scoped = ctx.for_agent(&self.name);
        let max = self.max_iterations;
        let mut loop_history = history.to_vec();
        let mut current = message;
        let mut final_response = None;

        scoped.log(format!(
            "Starting loop '{}' (max {max} iterations)...",
            self.name
        ));
        for iteration in 1..=max {
            scoped.check_canceled()?;
            scoped.emit(InvocationEventPayload::LoopIteration { iteration, max });
            tracing::debug!(workflow = %self.name, iteration, max, "loop iteration");

            let stage = |_: usize| WorkflowStage::LoopIteration { iteration, max };
            let response = match self.sub_agents.as_slice() {
                [single] => single
                    .process(ctx, &loop_history, current.clone())
                    .await
                    .map_err(|err| AdkError::sub_agent(&self.name, single.name(), stage(1), err))?,
                many => {
                    run_pipeline(&self.name, many, ctx, &loop_history, current.clone(), stage)
                        .await?
                }
            };

            let Some(response) = response else {
                return Err(AdkError::NilResponse {
                    agent: self.name.clone(),
                    iteration,
                });
            };

            if !current.is_empty() {
                loop_history.push(current);
            }
            loop_history.push(response.clone());

            let stop = (self.stop_condition)(&response);
            current = response.clone();
            final_response = Some(response);
            if stop {
                scoped.emit(InvocationEventPayload::LoopStopped { iteration });
                tracing::debug!(workflow = %self.name, iteration, "loop stop condition met");
                break;
            }
        }

        match final_response {
            Some(response) => Ok(Some(response)),
            None => Err(AdkError::Configuration(format!(
                "loop agent '{}' finished after {max} iterations without producing a final response",
                self.name
            ))),
        }
    }

    fn node(&self) -> AgentNode {
        AgentNode::new(&self.name, AgentKind::Loop)
            .with_children(self.sub_agents.iter().map(|agent| agent.node()).collect())
    }
}
