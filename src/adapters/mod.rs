//! Concrete implementations of the boundary traits.

pub mod mock;

pub use mock::MockFetchClient;
