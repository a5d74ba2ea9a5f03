//! The immutable conversation snapshot handed to observers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{ChatStatus, Message, QueuedMessage, RetryState};
use crate::stream::StreamState;

/// One conversation's fully reconciled state.
///
/// Snapshots are immutable: the store never mutates a published
/// `ConversationState`, it builds a successor and swaps the `Arc`.
/// Observers holding an old snapshot keep a consistent view for free.
///
/// Messages are stored behind `Arc` so the bulk-replace fast path can
/// use literal reference equality instead of deep comparison.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// ID of the conversation this state belongs to
    pub chat_id: String,
    /// Durable and optimistic messages by id
    pub messages_by_id: HashMap<i64, Arc<Message>>,
    /// Exactly the key set of `messages_by_id`, ascending by
    /// `created_at`, ties in first-seen order
    pub ordered_message_ids: Vec<i64>,
    /// Messages accepted by the server but not yet processed
    pub queued_messages: Vec<QueuedMessage>,
    /// Lifecycle status of the conversation
    pub chat_status: Option<ChatStatus>,
    /// The in-progress assistant turn; `Some` only while streaming
    pub stream: Option<StreamState>,
    /// Transport failure surfaced by the caller
    pub stream_error: Option<String>,
    /// Caller-reported retry progress
    pub retry: Option<RetryState>,
    /// Local status overrides for child conversations whose durable
    /// status has not propagated yet, keyed by chat id
    pub subagent_status_overrides: HashMap<String, ChatStatus>,
}

impl ConversationState {
    /// Create an empty state for a conversation.
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            ..Self::default()
        }
    }

    /// Look up a message by id.
    pub fn message(&self, id: i64) -> Option<&Arc<Message>> {
        self.messages_by_id.get(&id)
    }

    /// Messages in display order.
    pub fn ordered_messages(&self) -> impl Iterator<Item = &Arc<Message>> {
        self.ordered_message_ids
            .iter()
            .filter_map(|id| self.messages_by_id.get(id))
    }

    /// Whether any transient field is populated.
    ///
    /// Transient fields are the ones cleared by `reset_transient_state`:
    /// stream, stream_error, retry, and the subagent overrides.
    pub fn has_transient_state(&self) -> bool {
        self.stream.is_some()
            || self.stream_error.is_some()
            || self.retry.is_some()
            || !self.subagent_status_overrides.is_empty()
    }
}
