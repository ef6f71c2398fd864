use std::sync::Arc;

use crate::callbacks::CallbackContext;
use crate::error::{AdkError, Result};
use crate::invocation::{InvocationContext, InvocationEventPayload};
use crate::provider::{ModelProvider, ModelRequest, ModelResponse};
use crate::types::Message;

use super::super::LlmAgent;

/// One model round: before-model hook or backend call, then after-model hook.
pub(super) async fn request_response(
    agent: &LlmAgent,
    ctx: &InvocationContext,
    callback_ctx: &CallbackContext,
    provider: &Arc<dyn ModelProvider>,
    request: ModelRequest,
    round: usize,
) -> Result<Message> {
    let overridden = match &agent.callbacks.before_model {
        Some(hook) => hook(callback_ctx.clone(), request.clone()).await,
        None => None,
    };

    let mut response = match overridden {
        Some(response) => {
            ctx.emit(InvocationEventPayload::ModelCallOverridden { round });
            ctx.log(format!(
                "Agent '{}' model call was overridden by a callback.",
                agent.name
            ));
            response
        }
        None => call_backend(agent, ctx, provider, &request, round).await?,
    };

    if let Some(hook) = &agent.callbacks.after_model {
        if let Some(rewritten) = hook(callback_ctx.clone(), response.clone()).await {
            response = rewritten;
        }
    }

    response.content.ok_or_else(|| AdkError::EmptyResponse {
        agent: agent.name.clone(),
    })
}

async fn call_backend(
    agent: &LlmAgent,
    ctx: &InvocationContext,
    provider: &Arc<dyn ModelProvider>,
    request: &ModelRequest,
    round: usize,
) -> Result<ModelResponse> {
    ctx.check_canceled()?;
    tracing::debug!(
        agent = %agent.name,
        provider = provider.provider_name(),
        model = %request.model_id,
        round,
        tools = request.tools.len(),
        "calling model backend"
    );

    let result = tokio::select! {
        biased;
        _ = ctx.cancellation_token().cancelled() => return Err(AdkError::Canceled),
        result = provider.generate_content(request) => result,
    };

    result.map_err(|err| match err {
        AdkError::Canceled => AdkError::Canceled,
        other => AdkError::backend(&agent.name, other),
    })
}
