//! Invocation event stream types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::JsonObject;

/// Envelope delivered to an [`Observer`](super::Observer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationEvent {
    pub invocation_id: String,
    pub agent_name: String,
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: InvocationEventPayload,
}

/// Concrete event payloads emitted by agents and workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvocationEventPayload {
    AgentStarted,
    AgentShortCircuited,
    ModelCallOverridden {
        round: usize,
    },
    ToolCallsDispatched {
        round: usize,
        count: usize,
    },
    ToolCallStarted {
        name: String,
        args: JsonObject,
    },
    ToolCallFailed {
        name: String,
        error: String,
    },
    ToolCallCompleted {
        name: String,
    },
    ToolRoundTimedOut {
        round: usize,
        pending: Vec<String>,
    },
    RoundCompleted {
        round: usize,
    },
    WorkflowStep {
        index: usize,
        total: usize,
        child: String,
    },
    ParallelBranchStarted {
        child: String,
    },
    Synthesizing {
        branches: usize,
    },
    LoopIteration {
        iteration: usize,
        max: usize,
    },
    LoopStopped {
        iteration: usize,
    },
    Log {
        message: String,
    },
}
