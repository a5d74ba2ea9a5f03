//! Streaming-delta types and accumulation.
//!
//! While an assistant turn is generated token-by-token, the push channel
//! delivers [`MessagePart`] deltas that fold into a transient
//! [`StreamState`]. The fold rules live here; the store decides when a
//! fold becomes a committed snapshot.

mod events;
mod state;

pub use events::MessagePart;
pub use state::{StreamBlock, StreamState, ToolCallFragment, ToolResultFragment};
