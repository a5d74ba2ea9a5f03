//! Boundary error types.
//!
//! The store itself has no fatal error class: malformed stream parts
//! are swallowed, duplicates are reported through `UpsertOutcome`, and
//! transport failures are surfaced by the caller through
//! `set_stream_error` / `set_retry_state`. The enums here describe the
//! failures the *collaborators* report at the boundary.

use thiserror::Error;

/// Errors surfaced by the fetch client boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Could not reach the server
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No response within the deadline
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Server answered with an error status
    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether retrying the request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::ConnectionFailed(_) | FetchError::Timeout(_) => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Decode(_) => false,
        }
    }
}

/// Faults reported by the streaming-channel transport.
///
/// The transport owner classifies a failure here, then surfaces it to
/// the UI as a string through `set_stream_error`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamFault {
    /// Connection dropped mid-turn
    #[error("stream connection lost: {0}")]
    ConnectionLost(String),

    /// Server closed the stream deliberately
    #[error("stream closed by server: {reason}")]
    ServerClosed { reason: String },

    /// No data for too long
    #[error("stream stalled for {0}s")]
    Stalled(u64),

    /// Backend reported an error event over the stream
    #[error("backend error: {message}")]
    Backend {
        message: String,
        code: Option<String>,
    },
}

impl StreamFault {
    /// Whether the transport should attempt a reconnect.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamFault::ConnectionLost(_) | StreamFault::Stalled(_)
        )
    }
}
