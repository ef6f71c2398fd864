//! Shared test helpers: a queue-backed mock provider and a scripted agent.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use adk::agent::{Agent, AgentKind, AgentNode};
use adk::error::{AdkError, Result};
use adk::invocation::InvocationContext;
use adk::provider::{ModelProvider, ModelRequest, ModelResponse};
use adk::tools::Tool;
use adk::types::*;

/// A mock provider that returns queued responses, then "Mock response".
#[derive(Default)]
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<Message>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(Message::model(text)));
    }

    /// Queue a tool call response.
    pub fn queue_tool_call(&self, name: &str, args: serde_json::Value) {
        let args = match args {
            serde_json::Value::Object(map) => map,
            _ => JsonObject::new(),
        };
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(Message::new(
                Role::Model,
                vec![Part::function_call(name, args)],
            )));
    }

    /// Queue a backend failure.
    pub fn queue_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(AdkError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                message.to_string(),
            ))));
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn generate_content(&self, request: &ModelRequest) -> Result<ModelResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(message)) => Ok(ModelResponse::new(message)),
            Some(Err(err)) => Err(err),
            None => Ok(ModelResponse::new(Message::model("Mock response"))),
        }
    }
}

/// What a [`ScriptedAgent`] does when processed.
#[derive(Clone)]
pub enum Behavior {
    /// Reply with fixed text.
    Reply(&'static str),
    /// Reply with `"<prefix>(<input text>)"`.
    Wrap(&'static str),
    /// Reply with fixed text after sleeping.
    Delayed(&'static str, Duration),
    /// Fail with a configuration error.
    Fail(&'static str),
    /// Produce no message.
    Nothing,
    /// Reply with a text part plus a leftover function call part.
    TextWithCall(&'static str),
}

/// Input seen by a [`ScriptedAgent`] on one call.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenCall {
    pub history: Vec<Message>,
    pub message: Message,
}

/// Agent with scripted behavior that records every call.
pub struct ScriptedAgent {
    name: String,
    behavior: Behavior,
    calls: Mutex<Vec<SeenCall>>,
    finished: AtomicUsize,
}

impl ScriptedAgent {
    pub fn new(name: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behavior,
            calls: Mutex::new(Vec::new()),
            finished: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> Vec<SeenCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls that ran to completion (not dropped mid-flight).
    pub fn finished_count(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "scripted test agent"
    }

    fn model_identifier(&self) -> &str {
        "scripted"
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
        _ctx: &InvocationContext,
        history: &[Message],
        message: Message,
    ) -> Result<Option<Message>> {
        self.calls.lock().unwrap().push(SeenCall {
            history: history.to_vec(),
            message: message.clone(),
        });
        let outcome = match &self.behavior {
            Behavior::Reply(text) => Ok(Some(Message::model(*text))),
            Behavior::Wrap(prefix) => Ok(Some(Message::model(format!(
                "{prefix}({})",
                message.text()
            )))),
            Behavior::Delayed(text, delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Some(Message::model(*text)))
            }
            Behavior::Fail(reason) => Err(AdkError::Configuration(reason.to_string())),
            Behavior::Nothing => Ok(None),
            Behavior::TextWithCall(text) => Ok(Some(Message::new(
                Role::Model,
                vec![
                    Part::text(*text),
                    Part::function_call("pending_lookup", JsonObject::new()),
                ],
            ))),
        };
        self.finished.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    fn node(&self) -> AgentNode {
        AgentNode::new(&self.name, AgentKind::Llm)
    }
}

pub fn as_agent(agent: &Arc<ScriptedAgent>) -> Arc<dyn Agent> {
    agent.clone()
}
