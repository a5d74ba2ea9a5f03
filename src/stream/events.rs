//! Typed streaming-delta events from the push channel.
//!
//! Contains the `MessagePart` enum with every delta kind the backend
//! emits while an assistant turn is being generated.

use serde::{Deserialize, Serialize};

/// One incremental fragment of an in-progress assistant turn.
///
/// Fragments are folded into [`StreamState`](crate::stream::StreamState)
/// by append-or-create rules; see
/// [`StreamState::apply_part`](crate::stream::StreamState::apply_part).
///
/// Unrecognized kinds deserialize to [`MessagePart::Unknown`] and are
/// dropped during folding, so protocol drift degrades to a no-op rather
/// than an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    /// Incremental response text
    Text { text: String },
    /// Incremental reasoning/thinking text
    Reasoning { text: String },
    /// Tool call fragment; `input_chunk` carries a piece of the
    /// JSON-encoded arguments, streamed the same way text is
    ToolCall {
        tool_call_id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        input_chunk: String,
    },
    /// Tool result fragment
    ToolResult {
        tool_call_id: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        is_error: bool,
    },
    /// Fallback for delta kinds this client predates
    #[serde(other)]
    Unknown,
}

impl MessagePart {
    /// Returns the part kind as a string for logging purposes.
    pub fn kind(&self) -> &'static str {
        match self {
            MessagePart::Text { .. } => "text",
            MessagePart::Reasoning { .. } => "reasoning",
            MessagePart::ToolCall { .. } => "tool_call",
            MessagePart::ToolResult { .. } => "tool_result",
            MessagePart::Unknown => "unknown",
        }
    }

    /// Convenience constructor for a text delta.
    pub fn text(text: impl Into<String>) -> Self {
        MessagePart::Text { text: text.into() }
    }
}
