//! The observable conversation store.
//!
//! `ConversationStore` is the stateful shell around the pure transitions
//! in `reconcile`: it holds the current immutable snapshot, applies a
//! transition, and commits only when the transition reports a real
//! change. A commit atomically swaps the snapshot and synchronously
//! notifies every live subscriber exactly once.
//!
//! One store instance serves one open conversation; the view that opens
//! the conversation creates it and drops it on close. There is no
//! process-wide shared instance.

mod change;
mod ordering;
mod reconcile;
mod snapshot;

pub use reconcile::UpsertOutcome;
pub use snapshot::ConversationState;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::models::{ChatStatus, Message, QueuedMessage, RetryState};
use crate::stream::MessagePart;
use crate::traits::StreamEvent;

/// Handle returned by [`ConversationStore::subscribe`].
///
/// `unsubscribe` is idempotent and safe to call from inside a
/// notification callback; the store prunes dead registrations lazily on
/// the next commit.
#[derive(Debug, Clone)]
pub struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Stop this listener from receiving further notifications.
    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

struct Listener {
    active: Arc<AtomicBool>,
    callback: Box<dyn Fn(&ConversationState)>,
}

/// Observable state container for one conversation.
pub struct ConversationStore {
    snapshot: Arc<ConversationState>,
    listeners: Vec<Listener>,
}

impl ConversationStore {
    /// Create a store for one conversation.
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            snapshot: Arc::new(ConversationState::new(chat_id)),
            listeners: Vec::new(),
        }
    }

    /// Current snapshot, O(1).
    pub fn get_snapshot(&self) -> Arc<ConversationState> {
        Arc::clone(&self.snapshot)
    }

    /// Register a listener invoked synchronously after every commit.
    pub fn subscribe(&mut self, listener: impl Fn(&ConversationState) + 'static) -> Subscription {
        let active = Arc::new(AtomicBool::new(true));
        self.listeners.push(Listener {
            active: Arc::clone(&active),
            callback: Box::new(listener),
        });
        Subscription { active }
    }

    /// Rebuild the message collection wholesale. `None` means empty.
    ///
    /// Returns whether a new snapshot was committed.
    pub fn replace_messages(&mut self, messages: Option<Vec<Arc<Message>>>) -> bool {
        let next = reconcile::replace_messages(&self.snapshot, messages.unwrap_or_default());
        self.commit(next)
    }

    /// Merge one durable message; see [`UpsertOutcome`].
    ///
    /// Idempotent under at-least-once delivery: replaying the same or a
    /// value-equal message reports `changed: false` and notifies nobody.
    pub fn upsert_durable_message(&mut self, message: Message) -> UpsertOutcome {
        let (outcome, next) = reconcile::upsert_durable_message(&self.snapshot, message);
        self.commit(next);
        outcome
    }

    /// Fold one streaming delta into the in-progress turn.
    pub fn apply_message_part(&mut self, part: MessagePart) -> bool {
        let next = reconcile::apply_message_parts(&self.snapshot, std::slice::from_ref(&part));
        self.commit(next)
    }

    /// Fold a batch of streaming deltas as a single transition.
    ///
    /// Subscribers see one notification for the whole batch; an empty
    /// batch never notifies.
    pub fn apply_message_parts(&mut self, parts: &[MessagePart]) -> bool {
        let next = reconcile::apply_message_parts(&self.snapshot, parts);
        self.commit(next)
    }

    /// Set or clear the conversation status.
    pub fn set_chat_status(&mut self, status: Option<ChatStatus>) -> bool {
        let next = reconcile::set_chat_status(&self.snapshot, status);
        self.commit(next)
    }

    /// Surface a transport failure to observers.
    pub fn set_stream_error(&mut self, error: impl Into<String>) -> bool {
        let next = reconcile::set_stream_error(&self.snapshot, Some(error.into()));
        self.commit(next)
    }

    /// Clear a previously surfaced transport failure.
    pub fn clear_stream_error(&mut self) -> bool {
        let next = reconcile::set_stream_error(&self.snapshot, None);
        self.commit(next)
    }

    /// Record caller-driven retry progress.
    pub fn set_retry_state(&mut self, retry: RetryState) -> bool {
        let next = reconcile::set_retry_state(&self.snapshot, Some(retry));
        self.commit(next)
    }

    /// Clear the retry record after a successful attempt.
    pub fn clear_retry_state(&mut self) -> bool {
        let next = reconcile::set_retry_state(&self.snapshot, None);
        self.commit(next)
    }

    /// Override a child conversation's status until its durable status
    /// propagates.
    pub fn set_subagent_status_override(
        &mut self,
        chat_id: impl AsRef<str>,
        status: ChatStatus,
    ) -> bool {
        let next =
            reconcile::set_subagent_status_override(&self.snapshot, chat_id.as_ref(), status);
        self.commit(next)
    }

    /// Replace the queued-message list wholesale. `None` means empty.
    pub fn set_queued_messages(&mut self, messages: Option<Vec<QueuedMessage>>) -> bool {
        let next = reconcile::set_queued_messages(&self.snapshot, messages.unwrap_or_default());
        self.commit(next)
    }

    /// Drop the in-progress turn without touching anything else.
    pub fn clear_stream_state(&mut self) -> bool {
        let next = reconcile::clear_stream_state(&self.snapshot);
        self.commit(next)
    }

    /// Clear stream, stream error, retry record, and subagent overrides
    /// in one transition. Messages, queued list, and chat status stay.
    pub fn reset_transient_state(&mut self) -> bool {
        let next = reconcile::reset_transient_state(&self.snapshot);
        self.commit(next)
    }

    /// Route one streaming-channel event to the matching operation.
    ///
    /// A completed message is upserted and the transient stream state is
    /// dropped, since the durable entry supersedes it.
    pub fn apply_stream_event(&mut self, event: StreamEvent) -> bool {
        match event {
            StreamEvent::MessagePart { part } => self.apply_message_part(part),
            StreamEvent::MessageParts { parts } => self.apply_message_parts(&parts),
            StreamEvent::MessageComplete { message } => {
                let outcome = self.upsert_durable_message(message);
                let cleared = self.clear_stream_state();
                outcome.changed || cleared
            }
        }
    }

    /// Commit a candidate snapshot, if any, and notify subscribers.
    fn commit(&mut self, next: Option<ConversationState>) -> bool {
        let Some(next) = next else {
            return false;
        };

        self.snapshot = Arc::new(next);
        tracing::trace!(
            chat_id = %self.snapshot.chat_id,
            messages = self.snapshot.messages_by_id.len(),
            "committed new snapshot"
        );
        self.notify();
        true
    }

    fn notify(&mut self) {
        self.listeners
            .retain(|listener| listener.active.load(Ordering::SeqCst));

        let snapshot = Arc::clone(&self.snapshot);
        for listener in &self.listeners {
            // Re-check per listener: an earlier callback may have
            // unsubscribed a later one during this very notification.
            if listener.active.load(Ordering::SeqCst) {
                (listener.callback)(&snapshot);
            }
        }
    }
}

impl fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationStore")
            .field("chat_id", &self.snapshot.chat_id)
            .field("messages", &self.snapshot.messages_by_id.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentPart, MessageRole};
    use chrono::{Duration, Utc};
    use std::cell::Cell;
    use std::rc::Rc;

    fn message(id: i64, role: MessageRole, offset_secs: i64, text: &str) -> Message {
        Message {
            id,
            chat_id: "chat-1".to_string(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
            role,
            content: vec![ContentPart::text(text)],
        }
    }

    fn counting_store() -> (ConversationStore, Rc<Cell<usize>>) {
        let mut store = ConversationStore::new("chat-1");
        let count = Rc::new(Cell::new(0));
        let count_in_listener = Rc::clone(&count);
        store.subscribe(move |_| count_in_listener.set(count_in_listener.get() + 1));
        (store, count)
    }

    #[test]
    fn test_get_snapshot_is_stable_across_commits() {
        let mut store = ConversationStore::new("chat-1");
        let before = store.get_snapshot();

        store.upsert_durable_message(message(1, MessageRole::User, 0, "hi"));

        // The old snapshot is untouched; the new one sees the message.
        assert!(before.messages_by_id.is_empty());
        assert_eq!(store.get_snapshot().messages_by_id.len(), 1);
    }

    #[test]
    fn test_noop_operations_do_not_notify() {
        let (mut store, count) = counting_store();

        store.replace_messages(None);
        store.set_queued_messages(None);
        store.clear_stream_error();
        store.clear_retry_state();
        store.clear_stream_state();
        store.reset_transient_state();
        store.apply_message_parts(&[]);

        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_each_commit_notifies_once() {
        let (mut store, count) = counting_store();

        store.upsert_durable_message(message(1, MessageRole::User, 0, "hi"));
        assert_eq!(count.get(), 1);

        store.apply_message_parts(&[MessagePart::text("a"), MessagePart::text("b")]);
        assert_eq!(count.get(), 2);

        store.set_chat_status(Some(ChatStatus::Running));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_duplicate_upsert_reports_and_skips() {
        let (mut store, count) = counting_store();
        let original = message(5, MessageRole::Assistant, 0, "reply");

        let first = store.upsert_durable_message(original.clone());
        assert!(!first.is_duplicate);
        assert!(first.changed);

        let second = store.upsert_durable_message(original);
        assert!(second.is_duplicate);
        assert!(!second.changed);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unsubscribe_stops_only_that_listener() {
        let mut store = ConversationStore::new("chat-1");

        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));
        let a_in = Rc::clone(&a);
        let b_in = Rc::clone(&b);
        let sub_a = store.subscribe(move |_| a_in.set(a_in.get() + 1));
        store.subscribe(move |_| b_in.set(b_in.get() + 1));

        store.set_chat_status(Some(ChatStatus::Running));
        assert_eq!((a.get(), b.get()), (1, 1));

        sub_a.unsubscribe();
        sub_a.unsubscribe(); // idempotent

        store.set_chat_status(Some(ChatStatus::Completed));
        assert_eq!((a.get(), b.get()), (1, 2));
    }

    #[test]
    fn test_unsubscribe_from_inside_listener() {
        let mut store = ConversationStore::new("chat-1");

        let fired = Rc::new(Cell::new(0));
        let fired_in = Rc::clone(&fired);
        // Register, then unsubscribe from within the first notification.
        let slot: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));
        let slot_in = Rc::clone(&slot);
        let sub = store.subscribe(move |_| {
            fired_in.set(fired_in.get() + 1);
            if let Some(sub) = slot_in.take() {
                sub.unsubscribe();
            }
        });
        slot.set(Some(sub));

        store.set_chat_status(Some(ChatStatus::Running));
        store.set_chat_status(Some(ChatStatus::Completed));

        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_listener_sees_committed_snapshot() {
        let mut store = ConversationStore::new("chat-1");

        let seen = Rc::new(Cell::new(0usize));
        let seen_in = Rc::clone(&seen);
        store.subscribe(move |state| seen_in.set(state.ordered_message_ids.len()));

        store.replace_messages(Some(vec![
            Arc::new(message(1, MessageRole::User, 0, "a")),
            Arc::new(message(2, MessageRole::Assistant, 1, "b")),
        ]));

        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_replace_then_replay_same_refs_is_silent() {
        let (mut store, count) = counting_store();
        let batch: Vec<Arc<Message>> = vec![
            Arc::new(message(1, MessageRole::User, 0, "a")),
            Arc::new(message(2, MessageRole::Assistant, 1, "b")),
        ];

        assert!(store.replace_messages(Some(batch.clone())));
        assert!(!store.replace_messages(Some(batch)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_stream_event_dispatch_parts() {
        let mut store = ConversationStore::new("chat-1");

        store.apply_stream_event(StreamEvent::MessagePart {
            part: MessagePart::text("hello"),
        });
        store.apply_stream_event(StreamEvent::MessageParts {
            parts: vec![MessagePart::text(" "), MessagePart::text("world")],
        });

        let snapshot = store.get_snapshot();
        assert_eq!(
            snapshot.stream.as_ref().unwrap().response_text(),
            "hello world"
        );
    }

    #[test]
    fn test_stream_event_complete_upserts_and_clears_stream() {
        let mut store = ConversationStore::new("chat-1");
        store.apply_message_part(MessagePart::text("partial"));
        assert!(store.get_snapshot().stream.is_some());

        let changed = store.apply_stream_event(StreamEvent::MessageComplete {
            message: message(10, MessageRole::Assistant, 0, "final"),
        });

        assert!(changed);
        let snapshot = store.get_snapshot();
        assert!(snapshot.stream.is_none());
        assert!(snapshot.messages_by_id.contains_key(&10));
    }

    #[test]
    fn test_set_and_clear_retry_state() {
        let (mut store, count) = counting_store();

        assert!(store.set_retry_state(RetryState::new(1, "timeout")));
        assert!(!store.set_retry_state(RetryState::new(1, "timeout")));
        assert!(store.set_retry_state(RetryState::new(2, "timeout")));
        assert!(store.clear_retry_state());
        assert!(!store.clear_retry_state());

        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_stream_error_lifecycle() {
        let mut store = ConversationStore::new("chat-1");

        assert!(store.set_stream_error("connection lost"));
        assert!(!store.set_stream_error("connection lost"));
        assert_eq!(
            store.get_snapshot().stream_error.as_deref(),
            Some("connection lost")
        );

        assert!(store.clear_stream_error());
        assert!(store.get_snapshot().stream_error.is_none());
    }

    #[test]
    fn test_reset_transient_state_notifies_once() {
        let (mut store, count) = counting_store();

        store.apply_message_part(MessagePart::text("x"));
        store.set_stream_error("blip");
        store.set_subagent_status_override("child", ChatStatus::Running);
        let committed_before_reset = count.get();

        assert!(store.reset_transient_state());
        assert_eq!(count.get(), committed_before_reset + 1);
        assert!(!store.reset_transient_state());
        assert_eq!(count.get(), committed_before_reset + 1);
    }
}
