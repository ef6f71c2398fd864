//! Message types exchanged with the model backend and stored in history.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// String-keyed JSON object used for tool arguments and tool results.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Message {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::Text(text.into())])
    }

    /// Create a model message.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![Part::Text(text.into())])
    }

    /// Create a system instruction message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![Part::Text(text.into())])
    }

    /// A message with no parts. Stands in for a missing response in pipelines.
    pub fn empty(role: Role) -> Self {
        Self::new(role, Vec::new())
    }

    /// Wrap tool results into the synthetic function-role message fed back to the model.
    pub fn function_responses(responses: Vec<FunctionResponse>) -> Self {
        Self::new(
            Role::Function,
            responses.into_iter().map(Part::FunctionResponse).collect(),
        )
    }

    /// A message with zero parts carries nothing.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Extract the text content, concatenating all text parts.
    pub fn text(&self) -> String {
        self.text_parts().collect::<Vec<_>>().join("")
    }

    /// Iterate over the text parts in order.
    pub fn text_parts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Every function call in this message, in encounter order.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// Every function response in this message.
    pub fn function_responses_iter(&self) -> impl Iterator<Item = &FunctionResponse> {
        self.parts.iter().filter_map(|part| match part {
            Part::FunctionResponse(response) => Some(response),
            _ => None,
        })
    }

    pub fn has_function_calls(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, Part::FunctionCall(_)))
    }

    pub fn has_function_responses(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, Part::FunctionResponse(_)))
    }
}

/// Conversation role.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Model,
    #[serde(alias = "tool")]
    #[strum(to_string = "function", serialize = "tool")]
    Function,
    System,
}

/// A single part of message content. Exactly one variant per part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn function_call(name: impl Into<String>, args: JsonObject) -> Self {
        Self::FunctionCall(FunctionCall::new(name, args))
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: JsonObject,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: JsonObject) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// The result of a tool invocation, correlated to its call by tool name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    pub name: String,
    pub response: JsonObject,
}

impl FunctionResponse {
    pub fn new(name: impl Into<String>, response: JsonObject) -> Self {
        Self {
            name: name.into(),
            response,
        }
    }

    /// Error-shaped response: `{"error": "<message>"}`.
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut response = JsonObject::new();
        response.insert(
            "error".to_string(),
            serde_json::Value::String(message.into()),
        );
        Self::new(name, response)
    }

    /// The error message, if this response is error-shaped.
    pub fn error_message(&self) -> Option<&str> {
        self.response.get("error").and_then(|v| v.as_str())
    }

    pub fn is_error(&self) -> bool {
        self.error_message().is_some()
    }
}
