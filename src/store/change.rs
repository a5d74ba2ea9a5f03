//! Change detection for candidate snapshots.
//!
//! Two deliberately different equality regimes are in play and must not
//! be collapsed into one:
//!
//! - Bulk message replacement uses *reference* equality (`Arc::ptr_eq`
//!   per id). A re-fetch that returns the same objects is a no-op even
//!   though a deep comparison would also pass; a caller that rebuilds
//!   value-equal messages from scratch *does* commit, which is what
//!   keeps the in-place-update/no-resort behavior observable.
//! - Scalar and record fields use *structural* equality (`PartialEq`),
//!   because genuine content changes must be detected there.
//! - The queued list compares id sets only; content edits to a queued
//!   entry under the same id do not count as a change.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{Message, QueuedMessage};

/// Reference-equality fast path for bulk replacement: same key set and
/// every key mapped to the pointer-identical message.
pub(crate) fn same_message_refs(
    current: &HashMap<i64, Arc<Message>>,
    next: &HashMap<i64, Arc<Message>>,
) -> bool {
    current.len() == next.len()
        && next.iter().all(|(id, message)| {
            current
                .get(id)
                .is_some_and(|existing| Arc::ptr_eq(existing, message))
        })
}

/// Id-set equality for the queued-message list.
pub(crate) fn same_queued_ids(current: &[QueuedMessage], next: &[QueuedMessage]) -> bool {
    if current.len() != next.len() {
        return false;
    }
    let current_ids: HashSet<i64> = current.iter().map(|q| q.id).collect();
    next.iter().all(|q| current_ids.contains(&q.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentPart, MessageRole};
    use chrono::Utc;

    fn message(id: i64, text: &str) -> Arc<Message> {
        Arc::new(Message {
            id,
            chat_id: "chat-1".to_string(),
            created_at: Utc::now(),
            role: MessageRole::User,
            content: vec![ContentPart::text(text)],
        })
    }

    fn queued(id: i64) -> QueuedMessage {
        QueuedMessage {
            id,
            chat_id: "chat-1".to_string(),
            created_at: Utc::now(),
            content: Vec::new(),
        }
    }

    #[test]
    fn test_same_refs_with_identical_arcs() {
        let a = message(1, "hello");
        let b = message(2, "world");

        let current: HashMap<i64, Arc<Message>> =
            [(1, Arc::clone(&a)), (2, Arc::clone(&b))].into();
        let next: HashMap<i64, Arc<Message>> = [(1, a), (2, b)].into();

        assert!(same_message_refs(&current, &next));
    }

    #[test]
    fn test_value_equal_but_distinct_allocations_differ() {
        let current: HashMap<i64, Arc<Message>> = [(1, message(1, "hello"))].into();
        let next: HashMap<i64, Arc<Message>> = [(1, message(1, "hello"))].into();

        // Deep-equal content, different allocations: the fast path must
        // report a change, not swallow it.
        assert!(!same_message_refs(&current, &next));
    }

    #[test]
    fn test_different_key_sets_differ() {
        let a = message(1, "hello");
        let current: HashMap<i64, Arc<Message>> = [(1, Arc::clone(&a))].into();
        let next: HashMap<i64, Arc<Message>> = [(1, a), (2, message(2, "x"))].into();

        assert!(!same_message_refs(&current, &next));
    }

    #[test]
    fn test_queued_ids_ignore_content() {
        let mut edited = queued(1);
        edited.content.push(ContentPart::text("edited"));

        assert!(same_queued_ids(&[queued(1), queued(2)], &[edited, queued(2)]));
    }

    #[test]
    fn test_queued_ids_ignore_order() {
        assert!(same_queued_ids(
            &[queued(1), queued(2)],
            &[queued(2), queued(1)]
        ));
    }

    #[test]
    fn test_queued_ids_detect_membership_change() {
        assert!(!same_queued_ids(&[queued(1)], &[queued(2)]));
        assert!(!same_queued_ids(&[queued(1)], &[queued(1), queued(2)]));
    }
}
