//! Tungstenite-based realtime adapter.
//!
//! Wraps [`RealtimeClient`] and implements [`RealtimeConnection`] by
//! forwarding its events into a broadcast channel.

use tokio::sync::{broadcast, watch};

use crate::realtime::{RealtimeClient, RealtimeConfig, RealtimeEvent, RealtimeState, ShutdownHandle};
use crate::traits::RealtimeConnection;

/// Realtime connection adapter using tokio-tungstenite.
///
/// ```ignore
/// let bridge = TungsteniteRealtime::start(config.realtime_config());
/// let mut rx = bridge.subscribe();
/// ```
pub struct TungsteniteRealtime {
    stop: ShutdownHandle,
    events_tx: broadcast::Sender<RealtimeEvent>,
    state_rx: watch::Receiver<RealtimeState>,
}

impl TungsteniteRealtime {
    /// Begin connecting in the background. Until the bridge answers, the
    /// state reads `Disconnected` or `Reconnecting` and the console polls.
    pub fn start(config: RealtimeConfig) -> Self {
        let mut client = RealtimeClient::spawn(config);
        let state_rx = client.state_receiver();
        let stop = client.shutdown_handle();

        let (events_tx, _) = broadcast::channel(100);
        let forward_tx = events_tx.clone();

        // Ends when the client's loop stops and drops its event sender.
        tokio::spawn(async move {
            while let Some(event) = client.recv().await {
                // No subscribers is fine
                let _ = forward_tx.send(event);
            }
        });

        Self {
            stop,
            events_tx,
            state_rx,
        }
    }
}

impl RealtimeConnection for TungsteniteRealtime {
    fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.events_tx.subscribe()
    }

    fn state(&self) -> watch::Receiver<RealtimeState> {
        self.state_rx.clone()
    }

    fn shutdown(&self) {
        self.stop.shutdown();
    }
}
