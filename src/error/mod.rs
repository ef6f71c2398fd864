//! Error types for adk.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error produced by an external collaborator (model backend, tool, store).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Primary error type for all adk operations.
#[derive(Error, Debug)]
pub enum AdkError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM interaction failed for agent '{agent}': {source}")]
    Backend {
        agent: String,
        #[source]
        source: BoxError,
    },

    #[error("LLM returned a nil response content for agent '{agent}'")]
    EmptyResponse { agent: String },

    #[error("exceeded maximum tool calls ({max_rounds}) in a single turn for agent '{agent}'")]
    MaxToolRoundsExceeded { agent: String, max_rounds: usize },

    #[error("invocation canceled")]
    Canceled,

    #[error("sub-agent '{child}' of '{parent}' failed at {stage}: {source}")]
    SubAgent {
        parent: String,
        child: String,
        stage: WorkflowStage,
        #[source]
        source: Box<AdkError>,
    },

    #[error("workflow agent '{agent}' has no sub-agents to run")]
    EmptyWorkflow { agent: String },

    #[error("loop agent '{agent}' sub-agent returned a nil response on iteration {iteration}")]
    NilResponse { agent: String, iteration: usize },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which step of a composite agent a child failure happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowStage {
    SequentialStep { index: usize, total: usize },
    ParallelBranch { index: usize },
    LoopIteration { iteration: usize, max: usize },
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SequentialStep { index, total } => write!(f, "sequential step {index}/{total}"),
            Self::ParallelBranch { index } => write!(f, "parallel branch {index}"),
            Self::LoopIteration { iteration, max } => write!(f, "loop iteration {iteration}/{max}"),
        }
    }
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Backend,
    Protocol,
    Cancellation,
    Composite,
    Tool,
    Session,
    Serialization,
    Io,
}

impl AdkError {
    /// Wrap a model backend failure.
    pub fn backend(agent: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Backend {
            agent: agent.into(),
            source: source.into(),
        }
    }

    /// Wrap a child agent failure with the parent's identity and stage.
    pub fn sub_agent(
        parent: impl Into<String>,
        child: impl Into<String>,
        stage: WorkflowStage,
        source: AdkError,
    ) -> Self {
        Self::SubAgent {
            parent: parent.into(),
            child: child.into(),
            stage,
            source: Box::new(source),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Backend { .. } | Self::EmptyResponse { .. } => ErrorCategory::Backend,
            Self::MaxToolRoundsExceeded { .. } | Self::NilResponse { .. } => {
                ErrorCategory::Protocol
            }
            Self::EmptyWorkflow { .. } => ErrorCategory::Configuration,
            Self::Canceled => ErrorCategory::Cancellation,
            Self::SubAgent { .. } => ErrorCategory::Composite,
            Self::ToolExecution { .. } | Self::InvalidArgument(_) => ErrorCategory::Tool,
            Self::AgentNotFound(_) | Self::SessionNotFound(_) => ErrorCategory::Session,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::Io,
        }
    }

    /// Stable machine-readable kind, paired with the message for outer callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Backend { .. } => "backend",
            Self::EmptyResponse { .. } => "empty_response",
            Self::MaxToolRoundsExceeded { .. } => "max_tool_rounds_exceeded",
            Self::Canceled => "canceled",
            Self::SubAgent { .. } => "sub_agent",
            Self::EmptyWorkflow { .. } => "empty_workflow",
            Self::NilResponse { .. } => "nil_response",
            Self::ToolExecution { .. } => "tool_execution",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::AgentNotFound(_) => "agent_not_found",
            Self::SessionNotFound(_) => "session_not_found",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }

    /// Tool errors are recovered inside the engine; everything else ends the turn.
    pub fn is_fatal(&self) -> bool {
        self.category() != ErrorCategory::Tool
    }

    /// Whether this error, or any child error it wraps, is a cancellation.
    pub fn is_canceled(&self) -> bool {
        self.root_cause().category() == ErrorCategory::Cancellation
    }

    /// Follow `SubAgent` wrappers down to the originating error.
    pub fn root_cause(&self) -> &AdkError {
        let mut current = self;
        while let Self::SubAgent { source, .. } = current {
            current = source;
        }
        current
    }

    /// Structured form for the outermost caller.
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind().to_string(),
            category: self.category(),
            message: self.to_string(),
        }
    }
}

/// Kind + message pair surfaced to front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: String,
    pub category: ErrorCategory,
    pub message: String,
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AdkError>;
