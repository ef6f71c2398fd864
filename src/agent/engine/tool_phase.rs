use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tokio::time::Instant;

use crate::callbacks::{AfterToolCallback, BeforeToolCallback, CallbackContext};
use crate::error::{AdkError, Result};
use crate::invocation::{InvocationContext, InvocationEventPayload};
use crate::tools::{Tool, ToolArguments, ToolExecutionContext};
use crate::types::{FunctionCall, FunctionResponse};

use super::super::LlmAgent;

/// Run every call of one round concurrently and collect one response per call.
///
/// Responses come back in request order. Tool failures are folded into
/// error-shaped responses; only cancellation fails the round. Each call runs
/// on its own task: when the round stops waiting (cancellation or deadline),
/// unfinished calls are detached and left to complete, and their results are
/// discarded.
pub(super) async fn run_tool_phase(
    agent: &LlmAgent,
    ctx: &InvocationContext,
    callback_ctx: &CallbackContext,
    calls: &[FunctionCall],
    round: usize,
) -> Result<Vec<FunctionResponse>> {
    ctx.emit(InvocationEventPayload::ToolCallsDispatched {
        round,
        count: calls.len(),
    });
    ctx.log(format!(
        "Agent '{}' is calling {} tools in parallel...",
        agent.name,
        calls.len()
    ));
    tracing::debug!(agent = %agent.name, round, calls = calls.len(), "dispatching tool calls");

    let mut pending: FuturesUnordered<_> = calls
        .iter()
        .enumerate()
        .map(|(index, call)| {
            let job = ToolCallJob {
                agent_name: agent.name.clone(),
                tool: agent.tools.get(&call.name).cloned(),
                before_tool: agent.callbacks.before_tool.clone(),
                after_tool: agent.callbacks.after_tool.clone(),
                ctx: ctx.clone(),
                callback_ctx: callback_ctx.clone(),
                call: call.clone(),
            };
            let handle = tokio::spawn(job.run());
            async move { (index, handle.await) }
        })
        .collect();
    let mut slots: Vec<Option<FunctionResponse>> = vec![None; calls.len()];
    let deadline = agent.limits.tool_round_timeout.map(|t| Instant::now() + t);

    loop {
        tokio::select! {
            biased;
            _ = ctx.cancellation_token().cancelled() => {
                tracing::debug!(
                    agent = %agent.name,
                    round,
                    detached = pending.len(),
                    "tool round canceled"
                );
                return Err(AdkError::Canceled);
            }
            next = pending.next() => match next {
                Some((index, Ok(response))) => slots[index] = Some(response),
                Some((index, Err(join_err))) => {
                    let name = calls[index].name.as_str();
                    slots[index] = Some(failed(
                        &agent.name,
                        ctx,
                        name,
                        format!("tool '{name}' task aborted: {join_err}"),
                    ));
                }
                None => break,
            },
            _ = wait_until(deadline) => break,
        }
    }
    // Dropping the join handles detaches the remaining calls.
    drop(pending);

    let timeout_ms = agent
        .limits
        .tool_round_timeout
        .map(|t| t.as_millis())
        .unwrap_or_default();
    let mut timed_out = Vec::new();
    let responses = slots
        .into_iter()
        .zip(calls)
        .map(|(slot, call)| {
            slot.unwrap_or_else(|| {
                timed_out.push(call.name.clone());
                FunctionResponse::error(
                    &call.name,
                    format!("tool '{}' timed out after {timeout_ms}ms", call.name),
                )
            })
        })
        .collect();

    if !timed_out.is_empty() {
        tracing::warn!(agent = %agent.name, round, pending = ?timed_out, "tool round timed out");
        ctx.emit(InvocationEventPayload::ToolRoundTimedOut {
            round,
            pending: timed_out,
        });
    }
    Ok(responses)
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Everything one tool call needs, owned so it can run on its own task.
struct ToolCallJob {
    agent_name: String,
    tool: Option<Arc<dyn Tool>>,
    before_tool: Option<BeforeToolCallback>,
    after_tool: Option<AfterToolCallback>,
    ctx: InvocationContext,
    callback_ctx: CallbackContext,
    call: FunctionCall,
}

impl ToolCallJob {
    async fn run(self) -> FunctionResponse {
        let Self {
            agent_name,
            tool,
            before_tool,
            after_tool,
            ctx,
            callback_ctx,
            call,
        } = self;
        let name = call.name.as_str();
        ctx.emit(InvocationEventPayload::ToolCallStarted {
            name: name.to_string(),
            args: call.args.clone(),
        });

        let Some(tool) = tool else {
            return failed(&agent_name, &ctx, name, format!("tool '{name}' not found"));
        };

        let mut args = call.args.clone();
        if let Some(hook) = &before_tool {
            if let Some(rewritten) = hook(callback_ctx.clone(), tool.clone(), args.clone()).await {
                args = rewritten;
            }
        }

        let exec_ctx = ToolExecutionContext {
            agent_name: agent_name.clone(),
            invocation_id: ctx.invocation_id().to_string(),
            tool_name: name.to_string(),
            cancel: ctx.cancellation_token().child_token(),
        };
        let result = match tool
            .execute(&ToolArguments::from_object(args.clone()), &exec_ctx)
            .await
        {
            Ok(Value::Object(result)) => result,
            Ok(other) => {
                let message = format!(
                    "tool '{}' result is not a JSON object, but {}",
                    tool.name(),
                    json_kind(&other)
                );
                return failed(&agent_name, &ctx, name, message);
            }
            Err(err) => {
                let message = format!("tool '{}' execution failed: {err}", tool.name());
                return failed(&agent_name, &ctx, name, message);
            }
        };

        let result = match &after_tool {
            Some(hook) => hook(callback_ctx, tool.clone(), args, result.clone())
                .await
                .unwrap_or(result),
            None => result,
        };

        ctx.emit(InvocationEventPayload::ToolCallCompleted {
            name: name.to_string(),
        });
        FunctionResponse::new(name, result)
    }
}

fn failed(
    agent_name: &str,
    ctx: &InvocationContext,
    name: &str,
    message: String,
) -> FunctionResponse {
    tracing::warn!(agent = agent_name, tool = name, error = %message, "tool call failed");
    ctx.emit(InvocationEventPayload::ToolCallFailed {
        name: name.to_string(),
        error: message.clone(),
    });
    FunctionResponse::error(name, message)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
