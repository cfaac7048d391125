//! Mock realtime bridge for testing.

use tokio::sync::{broadcast, watch};

use crate::realtime::{RealtimeEvent, RealtimeState};
use crate::traits::RealtimeConnection;

/// Mock realtime connection.
///
/// Events are injected by the test and delivered to every subscriber; the
/// connection state is driven explicitly.
///
/// # Example
///
/// ```ignore
/// let mock = MockRealtime::new();
/// let mut rx = mock.subscribe();
/// mock.inject(RealtimeEvent::UnreadUpdate { jid, unread_count: 2 });
/// mock.simulate_disconnect();
/// ```
pub struct MockRealtime {
    events_tx: broadcast::Sender<RealtimeEvent>,
    state_tx: watch::Sender<RealtimeState>,
    state_rx: watch::Receiver<RealtimeState>,
}

impl MockRealtime {
    /// Create a new mock in connected state.
    pub fn new() -> Self {
        Self::with_state(RealtimeState::Connected)
    }

    /// Create a new mock in disconnected state.
    pub fn disconnected() -> Self {
        Self::with_state(RealtimeState::Disconnected)
    }

    fn with_state(state: RealtimeState) -> Self {
        let (events_tx, _) = broadcast::channel(100);
        let (state_tx, state_rx) = watch::channel(state);
        Self {
            events_tx,
            state_tx,
            state_rx,
        }
    }

    /// Deliver an event to all subscribers.
    pub fn inject(&self, event: RealtimeEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.events_tx.send(event);
    }

    pub fn simulate_disconnect(&self) {
        let _ = self.state_tx.send(RealtimeState::Disconnected);
    }

    pub fn simulate_reconnecting(&self, attempt: u32) {
        let _ = self.state_tx.send(RealtimeState::Reconnecting { attempt });
    }

    pub fn simulate_reconnected(&self) {
        let _ = self.state_tx.send(RealtimeState::Connected);
    }

    pub fn subscriber_count(&self) -> usize {
        self.events_tx.receiver_count()
    }
}

impl Default for MockRealtime {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeConnection for MockRealtime {
    fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.events_tx.subscribe()
    }

    fn state(&self) -> watch::Receiver<RealtimeState> {
        self.state_rx.clone()
    }

    fn shutdown(&self) {
        let _ = self.state_tx.send(RealtimeState::Disconnected);
    }
}
