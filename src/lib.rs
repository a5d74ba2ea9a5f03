//! Colloquy - a client-side conversation state store.
//!
//! Messages for a chat-style UI arrive from three uncoordinated
//! sources: bulk fetches of persisted history, optimistic local inserts
//! shown before any server ack, and incremental streaming deltas while
//! an assistant turn is generated. This crate reconciles the three into
//! one consistent, deduplicated, stably ordered view behind an
//! observable snapshot-plus-subscribe store.

pub mod adapters;
pub mod error;
pub mod models;
pub mod prelude;
pub mod store;
pub mod stream;
pub mod traits;
