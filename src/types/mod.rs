//! Core types for adk.

pub mod history;
pub mod message;

pub use history::{prune_in_place, push_turn, truncate_turns};
pub use message::*;
