//! Domain model types for the conversation store.
//!
//! This module contains the wire-level shapes consumed at the store's
//! boundaries:
//! - `Message` / `QueuedMessage`: durable and queued conversation entries
//! - `ContentPart`: the closed tagged content union
//! - `ChatStatus` / `RetryState`: transient status records

mod message;
mod status;

pub use message::{ContentPart, Message, MessageRole, QueuedMessage};
pub use status::{ChatStatus, RetryState};
