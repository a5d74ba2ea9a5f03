//! Streaming-channel event shapes.
//!
//! The push channel delivers already-parsed events; socket lifecycle,
//! reconnection, and retry policy all live with the transport owner.
//! The store only consumes these shapes, via
//! [`ConversationStore::apply_stream_event`](crate::store::ConversationStore::apply_stream_event).

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::models::Message;
use crate::store::ConversationStore;
use crate::stream::MessagePart;

/// One event from the streaming channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A single in-progress delta
    MessagePart { part: MessagePart },
    /// A batch of deltas to fold as one transition
    MessageParts { parts: Vec<MessagePart> },
    /// The turn finished; carries the full durable message
    MessageComplete { message: Message },
}

/// Drain a stream of channel events into the store.
///
/// Events are applied in arrival order; the return value counts the
/// commits that actually changed state, so a caller can tell a live
/// turn from a stream of echoes.
pub async fn pump_stream_events<S>(store: &mut ConversationStore, events: S) -> usize
where
    S: Stream<Item = StreamEvent>,
{
    futures::pin_mut!(events);
    let mut commits = 0;
    while let Some(event) = events.next().await {
        if store.apply_stream_event(event) {
            commits += 1;
        }
    }
    commits
}
