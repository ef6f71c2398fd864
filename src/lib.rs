//! adk: agent development kit
//!
//! A turn-based agent runtime: a leaf [`LlmAgent`](agent::LlmAgent) drives a
//! bounded loop of model calls and concurrent tool calls, and the workflow
//! combinators ([`SequentialAgent`](workflow::SequentialAgent),
//! [`ParallelAgent`](workflow::ParallelAgent), [`LoopAgent`](workflow::LoopAgent))
//! compose agents through the same [`Agent`](agent::Agent) contract.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use adk::prelude::*;
//!
//! # async fn example(provider: Arc<dyn ModelProvider>) -> adk::error::Result<()> {
//! let weather = FunctionTool::new(
//!     "get_weather",
//!     "Current weather for a city",
//!     ToolParameters::object().string("city", "City name", true).build(),
//!     |args, _ctx| async move {
//!         let city = args.get_str("city")?;
//!         Ok(serde_json::json!({ "city": city, "forecast": "sunny" }))
//!     },
//! );
//! let agent = LlmAgent::new("assistant", "gemini-2.5-flash")
//!     .with_instruction("You are a helpful travel assistant.")
//!     .with_provider(provider)
//!     .with_tool(weather.into_arc());
//!
//! let reply = agent
//!     .process(&InvocationContext::new(), &[], Message::user("Weather in Seoul?"))
//!     .await?;
//! println!("{}", reply.map(|m| m.text()).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod graph;
pub mod invocation;
pub mod prelude;
pub mod provider;
pub mod registry;
pub mod runner;
pub mod session;
pub mod tools;
pub mod types;
pub mod workflow;
