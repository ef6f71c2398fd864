use std::time::Duration;

use bon::Builder;

use crate::config::{AdkConfig, DEFAULT_MAX_TOOL_ROUNDS};

/// Bounds applied to one leaf-agent turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct EngineLimits {
    /// Model/tool rounds before the turn fails.
    #[builder(default = DEFAULT_MAX_TOOL_ROUNDS)]
    pub max_rounds: usize,
    /// Deadline for one round's concurrent tool batch. Unfinished calls are
    /// reported to the model as timed out.
    pub tool_round_timeout: Option<Duration>,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            tool_round_timeout: None,
        }
    }
}

impl EngineLimits {
    pub fn from_config(config: &AdkConfig) -> Self {
        Self {
            max_rounds: config.max_tool_rounds,
            tool_round_timeout: config.tool_round_timeout(),
        }
    }
}
