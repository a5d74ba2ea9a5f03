//! Fetch client trait abstraction.
//!
//! The store never performs network IO itself; callers resolve these
//! futures and feed the results into `replace_messages` /
//! `set_queued_messages`. The trait exists so tests and alternate
//! transports can inject their own implementation.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{Message, QueuedMessage};

/// Read-only access to durably persisted conversation data.
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// List the durable messages of a conversation.
    async fn list_messages(&self, chat_id: &str) -> Result<Vec<Message>, FetchError>;

    /// List the messages accepted but not yet processed by the server.
    async fn list_queued_messages(&self, chat_id: &str)
        -> Result<Vec<QueuedMessage>, FetchError>;
}
