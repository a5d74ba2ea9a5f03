//! Mock fetch client for tests.
//!
//! Serves canned responses from memory and can be primed to fail, so
//! store-seeding code paths can be exercised without a network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{Message, QueuedMessage};
use crate::traits::FetchClient;

/// In-memory [`FetchClient`] with canned responses.
#[derive(Debug, Default)]
pub struct MockFetchClient {
    messages: Mutex<HashMap<String, Vec<Message>>>,
    queued: Mutex<HashMap<String, Vec<QueuedMessage>>>,
    fail_with: Mutex<Option<FetchError>>,
}

impl MockFetchClient {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prime the durable messages returned for a conversation.
    pub fn set_messages(&self, chat_id: impl Into<String>, messages: Vec<Message>) {
        self.messages
            .lock()
            .expect("mock messages lock poisoned")
            .insert(chat_id.into(), messages);
    }

    /// Prime the queued messages returned for a conversation.
    pub fn set_queued_messages(&self, chat_id: impl Into<String>, queued: Vec<QueuedMessage>) {
        self.queued
            .lock()
            .expect("mock queued lock poisoned")
            .insert(chat_id.into(), queued);
    }

    /// Make every subsequent call fail with the given error.
    pub fn fail_with(&self, error: FetchError) {
        *self.fail_with.lock().expect("mock failure lock poisoned") = Some(error);
    }

    fn check_failure(&self) -> Result<(), FetchError> {
        match self.fail_with.lock().expect("mock failure lock poisoned").as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FetchClient for MockFetchClient {
    async fn list_messages(&self, chat_id: &str) -> Result<Vec<Message>, FetchError> {
        self.check_failure()?;
        Ok(self
            .messages
            .lock()
            .expect("mock messages lock poisoned")
            .get(chat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_queued_messages(
        &self,
        chat_id: &str,
    ) -> Result<Vec<QueuedMessage>, FetchError> {
        self.check_failure()?;
        Ok(self
            .queued
            .lock()
            .expect("mock queued lock poisoned")
            .get(chat_id)
            .cloned()
            .unwrap_or_default())
    }
}
