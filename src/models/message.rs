//! Durable and queued message types shared across the fetch and
//! streaming boundaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

/// One tagged content part within a message.
///
/// The wire format is a closed tagged union; part kinds this client
/// predates deserialize to [`ContentPart::Unknown`] rather than failing,
/// so a newer server never breaks an older client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    ToolCall {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_call_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
    Reasoning {
        text: String,
    },
    /// Fallback for unrecognized part kinds
    #[serde(other)]
    Unknown,
}

impl ContentPart {
    /// Convenience constructor for a plain text part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }
}

/// A durable message within a conversation.
///
/// Negative ids mark optimistic entries inserted locally before the
/// server acknowledged them; non-negative ids are server-assigned.
/// The two ranges never collide, which is what makes optimistic
/// placeholder supersession safe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Message ID from the backend, or a locally chosen negative id
    pub id: i64,
    /// ID of the conversation this message belongs to
    pub chat_id: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
    /// Role of the message sender
    pub role: MessageRole,
    /// Ordered content parts
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

impl Message {
    /// Whether this is a local placeholder not yet acknowledged by the server.
    pub fn is_optimistic(&self) -> bool {
        self.id < 0
    }
}

/// A message accepted by the server but not yet processed.
///
/// Lifecycle is independent of [`Message`]: queued entries are
/// wholesale-replaced from the backend rather than merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedMessage {
    pub id: i64,
    pub chat_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}
