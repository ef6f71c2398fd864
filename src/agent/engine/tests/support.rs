use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::agent::LlmAgent;
use crate::error::AdkError;
use crate::invocation::{InvocationEvent, Observer};
use crate::provider::{ModelProvider, ModelRequest, ModelResponse};
use crate::tools::{FunctionTool, Tool, ToolParameters};
use crate::types::{FunctionResponse, JsonObject, Message, Part, Role};

/// One scripted backend reply. The last step repeats once the script runs out.
#[derive(Clone, Debug)]
pub(super) enum Step {
    Text(&'static str),
    Calls(Vec<(&'static str, Value)>),
    TextAndCalls(&'static str, Vec<(&'static str, Value)>),
    Fail(&'static str),
    Empty,
    Hang,
}

pub(super) struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    pub(super) fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn call_count(&self) -> usize {
        self.requests.lock().expect("request lock").len()
    }

    pub(super) fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("request lock").clone()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock().expect("step lock");
        let mut last = self.last.lock().expect("step lock");
        match steps.pop_front() {
            Some(step) => {
                *last = Some(step.clone());
                step
            }
            None => last.clone().unwrap_or(Step::Text("done")),
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn generate_content(&self, request: &ModelRequest) -> Result<ModelResponse, AdkError> {
        self.requests
            .lock()
            .expect("request lock")
            .push(request.clone());
        match self.next_step() {
            Step::Text(text) => Ok(Message::model(text).into()),
            Step::Calls(calls) => Ok(Message::new(Role::Model, call_parts(calls)).into()),
            Step::TextAndCalls(text, calls) => {
                let mut parts = vec![Part::text(text)];
                parts.extend(call_parts(calls));
                Ok(Message::new(Role::Model, parts).into())
            }
            Step::Fail(message) => Err(AdkError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                message,
            ))),
            Step::Empty => Ok(ModelResponse::default()),
            Step::Hang => std::future::pending().await,
        }
    }
}

fn call_parts(calls: Vec<(&'static str, Value)>) -> Vec<Part> {
    calls
        .into_iter()
        .map(|(name, args)| Part::function_call(name, object(args)))
        .collect()
}

pub(super) fn object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

pub(super) fn test_agent(provider: &Arc<ScriptedProvider>) -> LlmAgent {
    LlmAgent::new("assistant", "test-model")
        .with_instruction("Answer briefly.")
        .with_provider(provider.clone())
}

pub(super) fn echo_tool(name: &'static str) -> Arc<dyn Tool> {
    FunctionTool::new(name, "Echo the arguments", ToolParameters::empty(), |args, _ctx| async move {
        Ok(json!({ "echo": args.raw().clone() }))
    })
    .into_arc()
}

pub(super) fn failing_tool(name: &'static str) -> Arc<dyn Tool> {
    FunctionTool::new(name, "Always fails", ToolParameters::empty(), move |_args, _ctx| async move {
        Err(AdkError::ToolExecution {
            tool_name: name.to_string(),
            message: "upstream unavailable".to_string(),
        })
    })
    .into_arc()
}

pub(super) fn scalar_tool(name: &'static str) -> Arc<dyn Tool> {
    FunctionTool::new(name, "Returns a bare string", ToolParameters::empty(), |_args, _ctx| async {
        Ok(json!("sunny"))
    })
    .into_arc()
}

/// Sleeps for `delay`, tracking how many instances run at once.
pub(super) fn tracked_tool(
    name: &'static str,
    delay: Duration,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
) -> Arc<dyn Tool> {
    FunctionTool::new(name, "Slow tool", ToolParameters::empty(), move |_args, _ctx| {
        let active = active.clone();
        let max_active = max_active.clone();
        async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            max_active.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            active.fetch_sub(1, Ordering::SeqCst);
            Ok(json!({ "tool": name, "status": "ok" }))
        }
    })
    .into_arc()
}

pub(super) fn sleeping_tool(name: &'static str, delay: Duration) -> Arc<dyn Tool> {
    tracked_tool(
        name,
        delay,
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
    )
}

pub(super) fn capture_events() -> (Observer, Arc<Mutex<Vec<InvocationEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let observer: Observer = Arc::new(move |event| {
        sink.lock().expect("event lock").push(event);
    });
    (observer, events)
}

/// Function responses carried by a request's latest message.
pub(super) fn fed_back_responses(request: &ModelRequest) -> Vec<FunctionResponse> {
    request
        .latest_message
        .function_responses_iter()
        .cloned()
        .collect()
}
