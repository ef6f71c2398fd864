//! Named agent registry owned and injected by the caller.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::error::{AdkError, Result};

/// Registration record, kept even when the agent failed to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_error: Option<String>,
}

impl AgentDefinition {
    pub fn is_available(&self) -> bool {
        self.init_error.is_none()
    }
}

/// Registry mapping agent names to built agents.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
    definitions: HashMap<String, AgentDefinition>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of building an agent. Failed builds stay visible
    /// through [`definitions`](Self::definitions) but cannot be resolved.
    pub fn register(&mut self, name: impl Into<String>, built: Result<Arc<dyn Agent>>) {
        let name = name.into();
        let init_error = match built {
            Ok(agent) => {
                self.agents.insert(name.clone(), agent);
                None
            }
            Err(err) => {
                tracing::warn!(agent = %name, error = %err, "could not initialize agent");
                self.agents.remove(&name);
                Some(err.to_string())
            }
        };
        self.definitions
            .insert(name.clone(), AgentDefinition { name, init_error });
    }

    /// Register an already built agent under its own name.
    pub fn register_agent(&mut self, agent: Arc<dyn Agent>) {
        let name = agent.name().to_string();
        self.register(name, Ok(agent));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    /// Like [`get`](Self::get) but explains why a name cannot be used.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Agent>> {
        if let Some(agent) = self.get(name) {
            return Ok(agent);
        }
        match self.definitions.get(name).and_then(|d| d.init_error.as_deref()) {
            Some(init_error) => Err(AdkError::Configuration(format!(
                "agent '{name}' is not initialized: {init_error}"
            ))),
            None => Err(AdkError::AgentNotFound(name.to_string())),
        }
    }

    /// Sorted names of successfully built agents.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }

    /// Every registration, sorted by name.
    pub fn definitions(&self) -> Vec<AgentDefinition> {
        let mut definitions: Vec<AgentDefinition> = self.definitions.values().cloned().collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.list())
            .field("definitions", &self.definitions.len())
            .finish()
    }
}
