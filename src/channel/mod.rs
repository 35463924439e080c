//! Event-channel client for the host application
//!
//! One outbound WebSocket connection carrying JSON event frames in both
//! directions: the client emits the demo script and answers host requests,
//! the host streams element and lifecycle events back.

pub mod client;
pub mod dispatcher;
pub mod gate;
pub mod protocol;
pub mod script;

pub use client::{ChannelClient, ConnState};
pub use dispatcher::AckPolicy;
