//! Conversation history helpers.
//!
//! History is an ordered list of [`Message`]s. Every level that appends to a
//! history works on its own copy; callers' slices are never mutated.

use super::message::Message;

/// Append one `(request, response)` turn.
pub fn push_turn(history: &mut Vec<Message>, request: Message, response: Message) {
    history.push(request);
    history.push(response);
}

/// Keep at most the last `max_turns` turns (`2 * max_turns` messages).
///
/// The window never starts on a function-response message: if the cut would
/// separate a response from its call, the orphaned responses are dropped too.
pub fn truncate_turns(history: &[Message], max_turns: usize) -> Vec<Message> {
    let max_messages = max_turns.saturating_mul(2);
    let mut start = history.len().saturating_sub(max_messages);
    while start < history.len() && starts_orphaned(history, start) {
        start += 1;
    }
    history[start..].to_vec()
}

/// In-place variant of [`truncate_turns`].
pub fn prune_in_place(history: &mut Vec<Message>, max_turns: usize) {
    let kept = truncate_turns(history, max_turns);
    if kept.len() != history.len() {
        *history = kept;
    }
}

fn starts_orphaned(history: &[Message], start: usize) -> bool {
    start > 0 && history[start].has_function_responses()
}
