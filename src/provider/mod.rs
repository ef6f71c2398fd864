//! Model backend contract.
//!
//! Concrete backends (network clients for a given provider) live outside this
//! crate; the engine only depends on [`ModelProvider`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AdkError;
use crate::tools::ToolDefinition;
use crate::types::Message;

/// A request sent to a model backend for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Message>,
    /// May be empty.
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    #[serde(default)]
    pub history: Vec<Message>,
    pub latest_message: Message,
}

/// Response from a model backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// `None` means the backend produced no content, which ends the turn with an error.
    pub content: Option<Message>,
}

impl ModelResponse {
    pub fn new(content: Message) -> Self {
        Self {
            content: Some(content),
        }
    }
}

impl From<Message> for ModelResponse {
    fn from(content: Message) -> Self {
        Self::new(content)
    }
}

/// Core trait implemented by model backends.
///
/// Backends are called strictly sequentially within one agent turn. Retries,
/// if any, are the backend's own concern.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &str;

    /// Produce one response message. Its parts may mix text and function calls.
    async fn generate_content(&self, request: &ModelRequest) -> Result<ModelResponse, AdkError>;
}
