//! Tool system for function calling.

pub mod arguments;
pub mod set;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use set::ToolSet;
pub use tool::{FunctionTool, Tool, ToolExecutionContext};
pub use types::{ParameterBuilder, ToolDefinition, ToolParameters};
