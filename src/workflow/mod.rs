//! Composite agents built from other agents.
//!
//! - **SequentialAgent**: runs sub-agents in order, piping each response into the next
//! - **ParallelAgent**: fans one input out to sub-agents concurrently, then synthesizes
//! - **LoopAgent**: repeats one sub-agent (or a sequence) until a stop condition or cap
//!
//! Every combinator implements [`Agent`](crate::agent::Agent), so they nest freely.

mod loop_agent;
mod parallel;
mod sequential;

pub use loop_agent::{LoopAgent, StopCondition};
pub use parallel::{synthesis_prompt, ParallelAgent};
pub use sequential::SequentialAgent;
