//! Typed access to tool call arguments.

use crate::error::AdkError;
use crate::types::JsonObject;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    pub fn from_object(args: JsonObject) -> Self {
        Self::new(serde_json::Value::Object(args))
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, AdkError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AdkError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument. Whole floats (`6.0`) are accepted.
    pub fn get_i64(&self, key: &str) -> Result<i64, AdkError> {
        let value = self
            .value
            .get(key)
            .ok_or_else(|| AdkError::InvalidArgument(format!("Missing integer argument: {key}")))?;
        if let Some(int) = value.as_i64() {
            return Ok(int);
        }
        match value.as_f64() {
            Some(float) if float.fract() == 0.0 => Ok(float as i64),
            _ => Err(AdkError::InvalidArgument(format!(
                "Argument '{key}' must be an integer, got {value}"
            ))),
        }
    }

    /// Get a float argument.
    pub fn get_f64(&self, key: &str) -> Result<f64, AdkError> {
        self.value
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| AdkError::InvalidArgument(format!("Missing float argument: {key}")))
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, AdkError> {
        self.value
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| AdkError::InvalidArgument(format!("Missing boolean argument: {key}")))
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, AdkError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            AdkError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
