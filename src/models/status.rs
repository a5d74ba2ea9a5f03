//! Conversation status and retry-report types.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    Running,
    Completed,
    Error,
}

/// Caller-reported retry progress for a failed operation.
///
/// The store does not retry anything itself; the transport owner
/// increments `attempt` per attempt and clears the record on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryState {
    /// 1-based attempt counter
    pub attempt: u32,
    /// Error message from the most recent failed attempt
    pub error: String,
}

impl RetryState {
    /// Create a retry record for the given attempt.
    pub fn new(attempt: u32, error: impl Into<String>) -> Self {
        Self {
            attempt,
            error: error.into(),
        }
    }
}
