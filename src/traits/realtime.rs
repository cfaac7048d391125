//! Realtime bridge connection abstraction.

use tokio::sync::{broadcast, watch};

use crate::realtime::{RealtimeEvent, RealtimeState};

/// Trait for the push channel delivering server-initiated events.
///
/// The console only consumes it: subscribe to events, watch the state.
pub trait RealtimeConnection: Send + Sync {
    /// Subscribe to incoming events.
    fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent>;

    /// Get a receiver for connection state changes.
    fn state(&self) -> watch::Receiver<RealtimeState>;

    /// Close the connection and stop reconnecting.
    fn shutdown(&self);
}
