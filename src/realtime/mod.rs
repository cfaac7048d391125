//! Realtime event bridge.
//!
//! [`RealtimeClient`] holds a Socket.IO WebSocket open to the backend and
//! turns its frames into [`RealtimeEvent`]s. The console consumes it through
//! the [`RealtimeConnection`](crate::traits::RealtimeConnection) trait.

pub mod client;
pub mod messages;

pub use client::{
    backoff_secs, RealtimeClient, RealtimeConfig, RealtimeError, RealtimeState, ShutdownHandle,
};
pub use messages::{parse_frame, Frame, FrameError, RealtimeEvent};
