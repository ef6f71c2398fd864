use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::EngineLimits;
use crate::agent::{Agent, LlmAgent};
use crate::callbacks::AgentCallbacks;
use crate::error::AdkError;
use crate::invocation::{InvocationContext, InvocationEventPayload};
use crate::provider::ModelResponse;
use crate::types::{Message, Role};

mod support;

use support::{
    capture_events, echo_tool, fed_back_responses, object, test_agent, ScriptedProvider, Step,
};

#[tokio::test]
async fn plain_answer_takes_exactly_one_backend_call() {
    let provider = ScriptedProvider::new(vec![Step::Text("hello there")]);
    let agent = test_agent(&provider).with_tool(echo_tool("echo"));

    let response = agent
        .process(&InvocationContext::new(), &[], Message::user("hi"))
        .await
        .expect("turn succeeds");

    assert_eq!(response, Some(Message::model("hello there")));
    assert_eq!(provider.call_count(), 1);

    let request = &provider.requests()[0];
    assert_eq!(request.model_id, "test-model");
    assert_eq!(request.system_instruction, Some(Message::system("Answer briefly.")));
    assert_eq!(request.tools.len(), 1);
    assert!(request.history.is_empty());
    assert_eq!(request.latest_message, Message::user("hi"));
}

#[tokio::test]
async fn each_tool_round_adds_one_backend_call() {
    let provider = ScriptedProvider::new(vec![
        Step::Calls(vec![("echo", json!({ "n": 1 }))]),
        Step::Calls(vec![("echo", json!({ "n": 2 }))]),
        Step::Text("finished"),
    ]);
    let agent = test_agent(&provider).with_tool(echo_tool("echo"));

    let response = agent
        .process(&InvocationContext::new(), &[], Message::user("go"))
        .await
        .expect("turn succeeds");

    assert_eq!(response.map(|m| m.text()), Some("finished".to_string()));
    assert_eq!(provider.call_count(), 3);

    let requests = provider.requests();
    assert_eq!(requests[1].history.len(), 2);
    assert_eq!(requests[2].history.len(), 4);
    assert_eq!(requests[2].latest_message.role, Role::Function);
    let fed_back = fed_back_responses(&requests[2]);
    assert_eq!(fed_back.len(), 1);
    assert_eq!(fed_back[0].response["echo"], json!({ "n": 2 }));
}

#[tokio::test]
async fn caller_history_is_copied_not_mutated() {
    let provider = ScriptedProvider::new(vec![
        Step::Calls(vec![("echo", json!({}))]),
        Step::Text("ok"),
    ]);
    let agent = test_agent(&provider).with_tool(echo_tool("echo"));
    let history = vec![Message::user("earlier"), Message::model("reply")];

    agent
        .process(&InvocationContext::new(), &history, Message::user("now"))
        .await
        .expect("turn succeeds");

    assert_eq!(history.len(), 2);
    let requests = provider.requests();
    assert_eq!(requests[0].history, history);
    assert_eq!(requests[1].history[..2], history[..]);
    assert_eq!(requests[1].history[2], Message::user("now"));
}

#[tokio::test]
async fn missing_provider_is_a_configuration_error() {
    let agent = LlmAgent::new("orphan", "test-model");

    let err = agent
        .process(&InvocationContext::new(), &[], Message::user("hi"))
        .await
        .expect_err("no provider");

    assert!(matches!(err, AdkError::Configuration(_)));
    assert_eq!(err.to_string(), "Configuration error: agent 'orphan' has no LLM provider configured");
}

#[tokio::test]
async fn backend_failure_aborts_the_turn() {
    let provider = ScriptedProvider::new(vec![Step::Fail("connection reset")]);
    let agent = test_agent(&provider);

    let err = agent
        .process(&InvocationContext::new(), &[], Message::user("hi"))
        .await
        .expect_err("backend fails");

    assert!(matches!(err, AdkError::Backend { ref agent, .. } if agent == "assistant"));
    assert!(err.to_string().contains("connection reset"));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn response_without_content_is_fatal() {
    let provider = ScriptedProvider::new(vec![Step::Empty]);
    let agent = test_agent(&provider);

    let err = agent
        .process(&InvocationContext::new(), &[], Message::user("hi"))
        .await
        .expect_err("empty response");

    assert!(matches!(err, AdkError::EmptyResponse { .. }));
}

#[tokio::test]
async fn round_cap_fails_after_exactly_max_rounds_calls() {
    let provider = ScriptedProvider::new(vec![Step::Calls(vec![("echo", json!({}))])]);
    let agent = test_agent(&provider)
        .with_tool(echo_tool("echo"))
        .with_limits(EngineLimits::builder().max_rounds(3).build());

    let err = agent
        .process(&InvocationContext::new(), &[], Message::user("loop forever"))
        .await
        .expect_err("cap exceeded");

    assert!(matches!(
        err,
        AdkError::MaxToolRoundsExceeded { max_rounds: 3, .. }
    ));
    assert!(err.to_string().contains("exceeded maximum tool calls"));
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn default_round_cap_is_ten() {
    let provider = ScriptedProvider::new(vec![Step::Calls(vec![("echo", json!({}))])]);
    let agent = test_agent(&provider).with_tool(echo_tool("echo"));

    let err = agent
        .process(&InvocationContext::new(), &[], Message::user("loop forever"))
        .await
        .expect_err("cap exceeded");

    assert!(matches!(
        err,
        AdkError::MaxToolRoundsExceeded { max_rounds: 10, .. }
    ));
    assert_eq!(provider.call_count(), 10);
}

#[tokio::test]
async fn observer_sees_round_lifecycle() {
    let provider = ScriptedProvider::new(vec![
        Step::Calls(vec![("echo", json!({ "q": "x" }))]),
        Step::Text("done"),
    ]);
    let agent = test_agent(&provider).with_tool(echo_tool("echo"));
    let (observer, events) = capture_events();
    let ctx = InvocationContext::new().with_observer(observer);

    agent
        .process(&ctx, &[], Message::user("go"))
        .await
        .expect("turn succeeds");

    let events = events.lock().expect("event lock");
    assert!(events.iter().all(|e| e.agent_name == "assistant"));
    let kinds: Vec<_> = events
        .iter()
        .filter(|e| !matches!(e.payload, InvocationEventPayload::Log { .. }))
        .map(|e| e.payload.clone())
        .collect();
    assert_eq!(
        kinds,
        vec![
            InvocationEventPayload::AgentStarted,
            InvocationEventPayload::ToolCallsDispatched { round: 1, count: 1 },
            InvocationEventPayload::ToolCallStarted {
                name: "echo".into(),
                args: support::object(json!({ "q": "x" })),
            },
            InvocationEventPayload::ToolCallCompleted {
                name: "echo".into()
            },
            InvocationEventPayload::RoundCompleted { round: 1 },
            InvocationEventPayload::RoundCompleted { round: 2 },
        ]
    );
}
