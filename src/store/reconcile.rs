//! Pure reconciliation transitions.
//!
//! One function per store operation. Each takes the current snapshot and
//! an input and returns `Some(next)` when the candidate differs from the
//! current state, or `None` when the operation is a no-op. The container
//! in `store::mod` owns committing and notification; nothing here has
//! side effects beyond log lines.

use std::sync::Arc;

use crate::models::{ChatStatus, Message, QueuedMessage, RetryState};
use crate::stream::MessagePart;

use super::snapshot::ConversationState;
use super::{change, ordering};

/// Outcome of an `upsert_durable_message` call.
///
/// `is_duplicate` tells the caller whether the id was already present,
/// independent of whether the content changed; a sender can use it to
/// distinguish a socket echo of its own REST-confirmed message from a
/// genuinely new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// An entry already existed at this message's id
    pub is_duplicate: bool,
    /// The committed state differs from the previous one
    pub changed: bool,
}

/// Rebuild the message collection wholesale.
///
/// No-op iff the resulting map has the same key set and every key maps
/// to the pointer-identical message. This is a reference-equality fast
/// path: a caller handing back the same `Arc`s (a re-resolved fetch, a
/// redundant invalidation) costs one comparison pass and no notify.
pub(crate) fn replace_messages(
    state: &ConversationState,
    messages: Vec<Arc<Message>>,
) -> Option<ConversationState> {
    let mut messages_by_id = std::collections::HashMap::with_capacity(messages.len());
    let mut arrival_ids = Vec::with_capacity(messages.len());
    for message in messages {
        // First occurrence wins for duplicate ids in the input.
        if !messages_by_id.contains_key(&message.id) {
            arrival_ids.push(message.id);
            messages_by_id.insert(message.id, message);
        }
    }

    if change::same_message_refs(&state.messages_by_id, &messages_by_id) {
        tracing::trace!(count = arrival_ids.len(), "replace_messages: identical refs, skipping");
        return None;
    }

    let mut next = state.clone();
    next.ordered_message_ids = ordering::sorted_ids(arrival_ids, &messages_by_id);
    next.messages_by_id = messages_by_id;
    Some(next)
}

/// Merge one durable message into the collection.
///
/// The central merge primitive, idempotent under at-least-once delivery:
/// - duplicate id, deep-equal content: nothing happens;
/// - duplicate id, different content: in-place replacement, the display
///   order is left untouched;
/// - new id: optimistic placeholders of the *same role* are superseded,
///   the message is inserted, and the ordering is recomputed because the
///   member set changed.
pub(crate) fn upsert_durable_message(
    state: &ConversationState,
    message: Message,
) -> (UpsertOutcome, Option<ConversationState>) {
    if let Some(existing) = state.messages_by_id.get(&message.id) {
        if existing.as_ref() == &message {
            tracing::debug!(id = message.id, "upsert: duplicate with identical content");
            return (
                UpsertOutcome {
                    is_duplicate: true,
                    changed: false,
                },
                None,
            );
        }

        tracing::debug!(id = message.id, "upsert: updating existing message in place");
        let mut next = state.clone();
        next.messages_by_id.insert(message.id, Arc::new(message));
        // Same membership, so the ordering stays exactly as it was.
        return (
            UpsertOutcome {
                is_duplicate: true,
                changed: true,
            },
            Some(next),
        );
    }

    let id = message.id;
    let role = message.role;

    let mut next = state.clone();
    // An authoritative message supersedes pending placeholders of its
    // own role only; a streamed assistant reply must not erase a user
    // message still waiting for its server ack.
    next.messages_by_id
        .retain(|_, existing| !(existing.is_optimistic() && existing.role == role));

    let mut ids: Vec<i64> = next.ordered_message_ids.clone();
    ids.retain(|existing_id| next.messages_by_id.contains_key(existing_id));
    ids.push(id);
    next.messages_by_id.insert(id, Arc::new(message));
    next.ordered_message_ids = ordering::sorted_ids(ids, &next.messages_by_id);

    tracing::debug!(id, "upsert: inserted new message");
    (
        UpsertOutcome {
            is_duplicate: false,
            changed: true,
        },
        Some(next),
    )
}

/// Fold a batch of streaming deltas into the transient stream state.
///
/// The whole batch is one transition. An empty batch, or a batch whose
/// every part is unknown or empty, changes nothing and commits nothing;
/// in particular it never materializes an empty `StreamState`.
pub(crate) fn apply_message_parts(
    state: &ConversationState,
    parts: &[MessagePart],
) -> Option<ConversationState> {
    if parts.is_empty() {
        return None;
    }

    let mut stream = state.stream.clone().unwrap_or_default();
    let mut changed = false;
    for part in parts {
        changed |= stream.apply_part(part);
    }
    if !changed {
        return None;
    }

    let mut next = state.clone();
    next.stream = Some(stream);
    Some(next)
}

/// Replace the chat status; structural equality gates the commit.
pub(crate) fn set_chat_status(
    state: &ConversationState,
    status: Option<ChatStatus>,
) -> Option<ConversationState> {
    if state.chat_status == status {
        return None;
    }
    let mut next = state.clone();
    next.chat_status = status;
    Some(next)
}

/// Replace the stream error; `None` clears it.
pub(crate) fn set_stream_error(
    state: &ConversationState,
    error: Option<String>,
) -> Option<ConversationState> {
    if state.stream_error == error {
        return None;
    }
    let mut next = state.clone();
    next.stream_error = error;
    Some(next)
}

/// Replace the retry record; `None` clears it.
pub(crate) fn set_retry_state(
    state: &ConversationState,
    retry: Option<RetryState>,
) -> Option<ConversationState> {
    if state.retry == retry {
        return None;
    }
    let mut next = state.clone();
    next.retry = retry;
    Some(next)
}

/// Set a local status override for a child conversation.
pub(crate) fn set_subagent_status_override(
    state: &ConversationState,
    chat_id: &str,
    status: ChatStatus,
) -> Option<ConversationState> {
    if state.subagent_status_overrides.get(chat_id) == Some(&status) {
        return None;
    }
    let mut next = state.clone();
    next.subagent_status_overrides
        .insert(chat_id.to_string(), status);
    Some(next)
}

/// Replace the queued-message list; id-set equality gates the commit.
pub(crate) fn set_queued_messages(
    state: &ConversationState,
    queued: Vec<QueuedMessage>,
) -> Option<ConversationState> {
    if change::same_queued_ids(&state.queued_messages, &queued) {
        return None;
    }
    let mut next = state.clone();
    next.queued_messages = queued;
    Some(next)
}

/// Drop the transient stream state.
pub(crate) fn clear_stream_state(state: &ConversationState) -> Option<ConversationState> {
    state.stream.as_ref()?;
    let mut next = state.clone();
    next.stream = None;
    Some(next)
}

/// Clear every transient field in one transition.
///
/// Durable state (messages, queued list, chat status) is untouched.
pub(crate) fn reset_transient_state(state: &ConversationState) -> Option<ConversationState> {
    if !state.has_transient_state() {
        return None;
    }
    let mut next = state.clone();
    next.stream = None;
    next.stream_error = None;
    next.retry = None;
    next.subagent_status_overrides.clear();
    Some(next)
}
