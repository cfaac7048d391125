use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};

use super::messages::{parse_frame, Frame, RealtimeEvent, NAMESPACE_CONNECT, PONG};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type WsSink = futures_util::stream::SplitSink<WsStream, WsMessage>;
type WsSource = futures_util::stream::SplitStream<WsStream>;

/// Realtime bridge errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RealtimeError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Realtime bridge connection state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeState {
    Connected,
    Reconnecting { attempt: u32 },
    Disconnected,
}

impl RealtimeState {
    pub fn is_connected(&self) -> bool {
        matches!(self, RealtimeState::Connected)
    }
}

/// Configuration for the realtime client
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Full WebSocket URL, including the Socket.IO query string.
    pub url: String,
    /// Attempts that back off exponentially before settling on
    /// `max_backoff_secs` between tries.
    pub max_retries: u8,
    pub max_backoff_secs: u64,
    /// Length of one backoff step.
    pub backoff_unit: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:3000/socket.io/?EIO=4&transport=websocket".to_string(),
            max_retries: 5,
            max_backoff_secs: 30,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RealtimeConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Wait before reconnection attempt `attempt` (1-based): 1, 2, 4, ...
    /// steps for the first `max_retries` attempts, `max_backoff_secs` steps
    /// for every attempt after that.
    pub fn reconnect_delay(&self, attempt: u32) -> Duration {
        let steps = if attempt <= u32::from(self.max_retries) {
            backoff_secs(attempt, self.max_backoff_secs)
        } else {
            self.max_backoff_secs
        };
        self.backoff_unit
            .saturating_mul(u32::try_from(steps).unwrap_or(u32::MAX))
    }
}

/// Exponential backoff in seconds for attempt `attempt` (1-based), capped at
/// `max_secs`.
pub fn backoff_secs(attempt: u32, max_secs: u64) -> u64 {
    let shift = attempt.saturating_sub(1).min(63);
    std::cmp::min(1u64 << shift, max_secs)
}

/// Client for the server's realtime event bridge.
pub struct RealtimeClient {
    incoming_rx: mpsc::Receiver<RealtimeEvent>,
    state_rx: watch::Receiver<RealtimeState>,
    shutdown: Arc<AtomicBool>,
}

impl RealtimeClient {
    /// Start the bridge in the background.
    ///
    /// The state starts `Disconnected`. A failed first connection and every
    /// later drop are retried with backoff until [`shutdown`](Self::shutdown).
    pub fn spawn(config: RealtimeConfig) -> Self {
        let (incoming_tx, incoming_rx) = mpsc::channel::<RealtimeEvent>(100);
        let (state_tx, state_rx) = watch::channel(RealtimeState::Disconnected);

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            let url = config.url.clone();
            let stream = match open_socket(url.clone()).await {
                Ok(stream) => Some(stream),
                Err(e) => {
                    warn!("Realtime bridge unavailable, retrying in background: {}", e);
                    reconnect_with(&config, &state_tx, &shutdown_clone, || {
                        open_socket(url.clone())
                    })
                    .await
                }
            };
            let Some(stream) = stream else {
                let _ = state_tx.send(RealtimeState::Disconnected);
                return;
            };

            info!("Connected to realtime bridge at {}", url);
            let _ = state_tx.send(RealtimeState::Connected);
            let (ws_sink, ws_source) = stream.split();
            run_connection_loop(
                config,
                ws_sink,
                ws_source,
                incoming_tx,
                state_tx,
                shutdown_clone,
            )
            .await;
        });

        Self {
            incoming_rx,
            state_rx,
            shutdown,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state_rx.borrow().is_connected()
    }

    pub fn state_receiver(&self) -> watch::Receiver<RealtimeState> {
        self.state_rx.clone()
    }

    /// Receive the next event
    pub async fn recv(&mut self) -> Option<RealtimeEvent> {
        self.incoming_rx.recv().await
    }

    pub fn shutdown(&self) {
        self.shutdown_handle().shutdown();
    }

    /// Stops the client without borrowing it, e.g. while another task is
    /// parked in [`recv`](Self::recv).
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(self.shutdown.clone())
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        if !self.0.swap(true, Ordering::SeqCst) {
            info!("Shutting down realtime client");
        }
    }
}

async fn open_socket(url: String) -> Result<WsStream, RealtimeError> {
    connect_async(url.as_str())
        .await
        .map(|(stream, _)| stream)
        .map_err(|e| RealtimeError::ConnectionFailed(e.to_string()))
}

impl Drop for RealtimeClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// What the loop should do with one text frame.
#[derive(Debug, PartialEq)]
enum FrameAction {
    Reply(&'static str),
    Deliver(RealtimeEvent),
    Nothing,
}

fn handle_text(text: &str) -> FrameAction {
    match parse_frame(text) {
        Ok(Frame::Open) => FrameAction::Reply(NAMESPACE_CONNECT),
        Ok(Frame::Ping) => FrameAction::Reply(PONG),
        Ok(Frame::Connected) => {
            debug!("Realtime namespace connected");
            FrameAction::Nothing
        }
        Ok(Frame::Event(event)) => FrameAction::Deliver(event),
        Ok(Frame::Ignored) => FrameAction::Nothing,
        Err(e) => {
            // Skip malformed frames
            warn!("Failed to parse realtime frame: {} - {}", e, text);
            FrameAction::Nothing
        }
    }
}

async fn run_connection_loop(
    config: RealtimeConfig,
    mut ws_sink: WsSink,
    mut ws_source: WsSource,
    incoming_tx: mpsc::Sender<RealtimeEvent>,
    state_tx: watch::Sender<RealtimeState>,
    shutdown: Arc<AtomicBool>,
) {
    let mut shutdown_check = tokio::time::interval(Duration::from_millis(250));

    loop {
        if shutdown.load(Ordering::SeqCst) {
            debug!("Shutdown signal received, closing realtime connection");
            let _ = ws_sink.close().await;
            break;
        }

        tokio::select! {
            msg = ws_source.next() => {
                let dropped = match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        match handle_text(&text) {
                            FrameAction::Reply(reply) => {
                                if let Err(e) = ws_sink.send(WsMessage::Text(reply.to_string())).await {
                                    error!("Failed to reply to realtime frame: {}", e);
                                }
                            }
                            FrameAction::Deliver(event) => {
                                debug!("Realtime event: {:?}", event);
                                if incoming_tx.send(event).await.is_err() {
                                    warn!("Event channel closed, shutting down");
                                    break;
                                }
                            }
                            FrameAction::Nothing => {}
                        }
                        false
                    }
                    Some(Ok(WsMessage::Ping(data))) => {
                        let _ = ws_sink.send(WsMessage::Pong(data)).await;
                        false
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        info!("Received close frame from realtime bridge");
                        true
                    }
                    Some(Ok(_)) => false,
                    Some(Err(e)) => {
                        error!("Realtime socket error: {}", e);
                        true
                    }
                    None => {
                        info!("Realtime stream ended");
                        true
                    }
                };

                if dropped {
                    let _ = state_tx.send(RealtimeState::Disconnected);
                    let reconnected = reconnect_with(&config, &state_tx, &shutdown, || {
                        open_socket(config.url.clone())
                    })
                    .await;
                    match reconnected {
                        Some(stream) => {
                            let (new_sink, new_source) = stream.split();
                            ws_sink = new_sink;
                            ws_source = new_source;
                            let _ = state_tx.send(RealtimeState::Connected);
                        }
                        None => break,
                    }
                }
            }
            _ = shutdown_check.tick() => {}
        }
    }

    info!("Realtime connection loop ended");
    let _ = state_tx.send(RealtimeState::Disconnected);
}

/// Retry `connect` until it succeeds. Gives up only on shutdown.
async fn reconnect_with<T, E, F, Fut>(
    config: &RealtimeConfig,
    state_tx: &watch::Sender<RealtimeState>,
    shutdown: &AtomicBool,
    mut connect: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut attempt: u32 = 0;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return None;
        }
        attempt = attempt.saturating_add(1);
        let _ = state_tx.send(RealtimeState::Reconnecting { attempt });

        let wait = config.reconnect_delay(attempt);
        if attempt == u32::from(config.max_retries) + 1 {
            warn!("Realtime bridge still unreachable, retrying every {:?}", wait);
        }
        debug!("Realtime reconnection attempt {}, waiting {:?}", attempt, wait);
        tokio::time::sleep(wait).await;

        if shutdown.load(Ordering::SeqCst) {
            return None;
        }
        match connect().await {
            Ok(connection) => {
                info!("Realtime bridge reconnected on attempt {}", attempt);
                return Some(connection);
            }
            Err(e) => debug!("Realtime reconnection attempt {} failed: {}", attempt, e),
        }
    }
}
