//! Tool parameter schemas and the descriptor sent to the model backend.

use serde::{Deserialize, Serialize};

/// JSON Schema-based parameter definition for a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameters {
    /// JSON Schema object describing the parameters.
    pub schema: serde_json::Value,
}

impl ToolParameters {
    /// Create from a raw JSON Schema value.
    pub fn from_schema(schema: serde_json::Value) -> Self {
        Self { schema }
    }

    /// Create an empty parameter schema (no parameters).
    pub fn empty() -> Self {
        Self {
            schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
        }
    }

    /// Builder: create an object schema with properties.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }
}

/// Builder for constructing tool parameter schemas.
pub struct ParameterBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    fn property(
        mut self,
        name: impl Into<String>,
        property: serde_json::Value,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), property);
        if required {
            self.required.push(name);
        }
        self
    }

    /// Add a string property.
    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let description = description.into();
        self.property(
            name,
            serde_json::json!({ "type": "string", "description": description }),
            required,
        )
    }

    /// Add an integer property.
    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let description = description.into();
        self.property(
            name,
            serde_json::json!({ "type": "integer", "description": description }),
            required,
        )
    }

    /// Add a number property.
    pub fn number(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let description = description.into();
        self.property(
            name,
            serde_json::json!({ "type": "number", "description": description }),
            required,
        )
    }

    /// Add a boolean property.
    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let description = description.into();
        self.property(
            name,
            serde_json::json!({ "type": "boolean", "description": description }),
            required,
        )
    }

    /// Add an enum (string) property.
    pub fn string_enum(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: &[&str],
        required: bool,
    ) -> Self {
        let description = description.into();
        self.property(
            name,
            serde_json::json!({
                "type": "string",
                "description": description,
                "enum": values,
            }),
            required,
        )
    }

    /// Build into [`ToolParameters`].
    pub fn build(self) -> ToolParameters {
        ToolParameters {
            schema: serde_json::json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}

/// Tool descriptor handed to the model backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}
