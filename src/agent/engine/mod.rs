//! The leaf-agent tool-calling loop.
//!
//! One turn is a bounded series of rounds. Each round asks the model for a
//! response; a response without function calls ends the turn, otherwise every
//! requested call is dispatched concurrently and the collected results become
//! the next round's message.

mod limits;
mod model_phase;
mod tool_phase;

#[cfg(test)]
mod tests;

pub use limits::EngineLimits;

use crate::callbacks::CallbackContext;
use crate::error::{AdkError, Result};
use crate::invocation::{InvocationContext, InvocationEventPayload};
use crate::provider::ModelRequest;
use crate::types::{push_turn, FunctionCall, Message};

use super::LlmAgent;

pub(crate) async fn run_turn(
    agent: &LlmAgent,
    ctx: &InvocationContext,
    history: &[Message],
    message: Message,
) -> Result<Option<Message>> {
    let Some(provider) = agent.provider.clone() else {
        return Err(AdkError::Configuration(format!(
            "agent '{}' has no LLM provider configured",
            agent.name
        )));
    };

    let ctx = ctx.for_agent(&agent.name);
    let callback_ctx = CallbackContext::new(&ctx, &agent.name, &message);
    ctx.emit(InvocationEventPayload::AgentStarted);
    tracing::debug!(
        agent = %agent.name,
        invocation_id = %ctx.invocation_id(),
        history = history.len(),
        "agent turn started"
    );

    if let Some(hook) = &agent.callbacks.before_agent {
        if let Some(response) = hook(callback_ctx.clone()).await {
            ctx.emit(InvocationEventPayload::AgentShortCircuited);
            tracing::debug!(agent = %agent.name, "before-agent hook supplied the response");
            return Ok(Some(response));
        }
    }

    let tools = agent.tools.definitions();
    let mut turn_history = history.to_vec();
    let mut current = message;

    for round in 1..=agent.limits.max_rounds {
        ctx.check_canceled()?;

        let request = ModelRequest {
            model_id: agent.model_id.clone(),
            system_instruction: agent.instruction.clone(),
            tools: tools.clone(),
            history: turn_history.clone(),
            latest_message: current.clone(),
        };
        let response =
            model_phase::request_response(agent, &ctx, &callback_ctx, &provider, request, round)
                .await?;

        push_turn(&mut turn_history, current, response.clone());

        let calls: Vec<FunctionCall> = response.function_calls().into_iter().cloned().collect();
        if calls.is_empty() {
            ctx.emit(InvocationEventPayload::RoundCompleted { round });
            tracing::debug!(agent = %agent.name, round, "turn finished with a final answer");
            let overridden = match &agent.callbacks.after_agent {
                Some(hook) => hook(callback_ctx.clone(), Some(response.clone())).await,
                None => None,
            };
            return Ok(Some(overridden.unwrap_or(response)));
        }

        let responses = tool_phase::run_tool_phase(agent, &ctx, &callback_ctx, &calls, round).await?;
        ctx.emit(InvocationEventPayload::RoundCompleted { round });
        current = Message::function_responses(responses);
    }

    if let Some(hook) = &agent.callbacks.after_agent {
        if let Some(response) = hook(callback_ctx, None).await {
            tracing::debug!(agent = %agent.name, "after-agent hook recovered a capped turn");
            return Ok(Some(response));
        }
    }

    tracing::warn!(
        agent = %agent.name,
        max_rounds = agent.limits.max_rounds,
        "tool round cap reached"
    );
    Err(AdkError::MaxToolRoundsExceeded {
        agent: agent.name.clone(),
        max_rounds: agent.limits.max_rounds,
    })
}
