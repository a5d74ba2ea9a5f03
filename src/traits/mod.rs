//! Boundary seams for external collaborators.
//!
//! The store core is synchronous and infallible; everything that can
//! fail or block lives behind these seams:
//!
//! - [`FetchClient`] - REST access to durable and queued messages
//! - [`StreamEvent`] - already-parsed events from the push channel

pub mod fetch;
pub mod stream;

pub use fetch::FetchClient;
pub use stream::{pump_stream_events, StreamEvent};
