//! Forum client: access layer for a topic-based publish/subscribe forum.
//!
//! Resilient transport, typed service client, identity resolution, the
//! feed consistency guard and a presentation adapter, tied together by
//! the `Forum` façade.

// Foundation
pub mod constants;
pub mod error;
pub mod id_gen;
pub mod time_utils;

// Access layer
pub mod payload;
pub mod transport;
pub mod client;
pub mod identity;
pub mod guard;
pub mod present;
pub mod summary;
pub mod forum;

// Sub-systems
pub mod config;
pub mod storage;
pub mod tracing_init;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-exports for convenience
pub use error::{ForumError, ForumResult};
pub use forum::Forum;
