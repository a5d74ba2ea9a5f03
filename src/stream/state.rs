//! Accumulated state of an in-progress assistant turn.
//!
//! `StreamState` exists only between the first delta of a turn and its
//! completion or reset; once the backend delivers the full durable
//! message, the caller clears it and the durable entry takes over.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::events::MessagePart;

/// One semantic unit of accumulated streaming content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamBlock {
    /// Response text shown to the user
    Response { text: String },
    /// Reasoning/thinking text
    Thinking { text: String },
}

/// Accumulated tool call fragments, keyed by call id in [`StreamState`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolCallFragment {
    /// Tool name, set by the first fragment that carries it
    pub name: Option<String>,
    /// JSON argument text accumulated chunk by chunk
    pub input_json: String,
}

/// Accumulated tool result fragments, keyed by call id in [`StreamState`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolResultFragment {
    /// Result content accumulated chunk by chunk
    pub content: String,
    /// Whether the tool reported an error
    pub is_error: bool,
}

/// The in-progress assistant turn before it becomes a durable message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamState {
    /// Ordered content blocks accumulated so far
    pub blocks: Vec<StreamBlock>,
    /// Tool call fragments by tool_call_id
    pub tool_calls: HashMap<String, ToolCallFragment>,
    /// Tool result fragments by tool_call_id
    pub tool_results: HashMap<String, ToolResultFragment>,
}

impl StreamState {
    /// Create an empty stream state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one delta into the accumulated state.
    ///
    /// Text and reasoning deltas append to the trailing block of the
    /// matching kind, or open a new block seeded with the delta. Tool
    /// fragments append-or-create keyed on the call id. Unknown kinds
    /// are dropped.
    ///
    /// Returns `true` if the state changed.
    pub fn apply_part(&mut self, part: &MessagePart) -> bool {
        match part {
            MessagePart::Text { text } => {
                if text.is_empty() {
                    return false;
                }
                if let Some(StreamBlock::Response { text: last }) = self.blocks.last_mut() {
                    last.push_str(text);
                } else {
                    self.blocks.push(StreamBlock::Response { text: text.clone() });
                }
                true
            }
            MessagePart::Reasoning { text } => {
                if text.is_empty() {
                    return false;
                }
                if let Some(StreamBlock::Thinking { text: last }) = self.blocks.last_mut() {
                    last.push_str(text);
                } else {
                    self.blocks.push(StreamBlock::Thinking { text: text.clone() });
                }
                true
            }
            MessagePart::ToolCall {
                tool_call_id,
                name,
                input_chunk,
            } => {
                let fragment = self.tool_calls.entry(tool_call_id.clone()).or_default();
                if let Some(name) = name {
                    fragment.name = Some(name.clone());
                }
                fragment.input_json.push_str(input_chunk);
                true
            }
            MessagePart::ToolResult {
                tool_call_id,
                content,
                is_error,
            } => {
                let fragment = self.tool_results.entry(tool_call_id.clone()).or_default();
                fragment.content.push_str(content);
                fragment.is_error |= is_error;
                true
            }
            MessagePart::Unknown => {
                tracing::trace!("ignoring unknown stream part");
                false
            }
        }
    }

    /// Concatenated response text across all response blocks.
    pub fn response_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                StreamBlock::Response { text } => Some(text.as_str()),
                StreamBlock::Thinking { .. } => None,
            })
            .collect()
    }

    /// Whether nothing has accumulated yet.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.tool_calls.is_empty() && self.tool_results.is_empty()
    }
}
