//! Configuration system (layered: code > env > TOML file > defaults).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AdkError, Result};

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 10;
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 20;

const MAX_TOOL_ROUNDS_ENV: &str = "ADK_MAX_TOOL_ROUNDS";
const TOOL_ROUND_TIMEOUT_MS_ENV: &str = "ADK_TOOL_ROUND_TIMEOUT_MS";
const MAX_HISTORY_TURNS_ENV: &str = "ADK_MAX_HISTORY_TURNS";
const DEBUG_ENV: &str = "ADK_DEBUG";

/// Runtime settings for agents and the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdkConfig {
    /// Model/tool rounds allowed in one leaf-agent turn.
    pub max_tool_rounds: usize,
    /// Upper bound on one round's concurrent tool batch. `None` waits indefinitely.
    pub tool_round_timeout_ms: Option<u64>,
    /// Turns kept in a session history after each runner turn.
    pub max_history_turns: usize,
    pub debug: bool,
}

impl Default for AdkConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            tool_round_timeout_ms: None,
            max_history_turns: DEFAULT_MAX_HISTORY_TURNS,
            debug: false,
        }
    }
}

impl AdkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with environment variables (`.env` is loaded if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| AdkError::Configuration(format!("invalid adk config: {e}")))?;
        Ok(config.normalized())
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// File layer (if any) overlaid with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Overlay values found through `lookup`. Unparseable or zero values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(rounds) = lookup(MAX_TOOL_ROUNDS_ENV).and_then(|v| parse_positive_usize(&v)) {
            self.max_tool_rounds = rounds;
        }
        if let Some(timeout) =
            lookup(TOOL_ROUND_TIMEOUT_MS_ENV).and_then(|v| parse_positive_usize(&v))
        {
            self.tool_round_timeout_ms = Some(timeout as u64);
        }
        if let Some(turns) = lookup(MAX_HISTORY_TURNS_ENV).and_then(|v| parse_positive_usize(&v)) {
            self.max_history_turns = turns;
        }
        if let Some(debug) = lookup(DEBUG_ENV).and_then(|v| parse_flag(&v)) {
            self.debug = debug;
        }
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_tool_round_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_round_timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    pub fn with_max_history_turns(mut self, turns: usize) -> Self {
        self.max_history_turns = turns;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn tool_round_timeout(&self) -> Option<Duration> {
        self.tool_round_timeout_ms.map(Duration::from_millis)
    }

    fn normalized(mut self) -> Self {
        if self.max_tool_rounds == 0 {
            self.max_tool_rounds = DEFAULT_MAX_TOOL_ROUNDS;
        }
        if self.max_history_turns == 0 {
            self.max_history_turns = DEFAULT_MAX_HISTORY_TURNS;
        }
        if self.tool_round_timeout_ms == Some(0) {
            self.tool_round_timeout_ms = None;
        }
        self
    }
}

pub(crate) fn parse_positive_usize(value: &str) -> Option<usize> {
    let parsed = value.trim().parse::<usize>().ok()?;
    if parsed == 0 {
        None
    } else {
        Some(parsed)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
