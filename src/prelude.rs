//! Prelude module for convenient imports.
//!
//! ```ignore
//! use colloquy::prelude::*;
//! ```

// Store
pub use crate::store::{ConversationState, ConversationStore, Subscription, UpsertOutcome};

// Model types
pub use crate::models::{ChatStatus, ContentPart, Message, MessageRole, QueuedMessage, RetryState};

// Streaming types
pub use crate::stream::{MessagePart, StreamBlock, StreamState};

// Boundary seams
pub use crate::traits::{FetchClient, StreamEvent};
