//! Realtime bridge events and frame decoding.
//!
//! The bridge speaks Socket.IO v4 over a WebSocket. Only the handful of
//! packet types the console needs are decoded:
//!
//! | Frame | Meaning | Reaction |
//! |-------|---------|----------|
//! | `0{...}` | engine.io open | reply `40` (namespace connect) |
//! | `2` | engine.io ping | reply `3` |
//! | `40...` | namespace connected | none |
//! | `42["event", payload]` | event | decoded into [`RealtimeEvent`] |
//!
//! A plain JSON envelope `{"event": "...", "data": {...}}` is accepted too.

use serde::Deserialize;

use crate::models::{Jid, Message, MessageStatus};

pub const EVENT_MESSAGE_NEW: &str = "message:new";
pub const EVENT_MESSAGE_STATUS: &str = "message:status";
pub const EVENT_UNREAD_UPDATE: &str = "unread:update";

/// Client reply to the engine.io open packet.
pub const NAMESPACE_CONNECT: &str = "40";
/// Client reply to an engine.io ping.
pub const PONG: &str = "3";

/// Server-initiated event delivered to the console.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    /// `message:new`
    NewMessage(Message),
    /// `message:status`
    StatusUpdate {
        message_id: String,
        status: MessageStatus,
    },
    /// `unread:update`
    UnreadUpdate { jid: Jid, unread_count: u32 },
}

/// A decoded text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Open,
    Ping,
    Connected,
    Event(RealtimeEvent),
    /// Valid but irrelevant to the console (acks, unknown events, pongs).
    Ignored,
}

/// Frame decoding failures. The client logs and skips them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("Malformed frame: {0}")]
    Malformed(String),
    #[error("Invalid payload for '{event}': {message}")]
    Payload { event: String, message: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusPayload {
    message_id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnreadPayload {
    jid: String,
    #[serde(default)]
    unread_count: u32,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decode one text frame.
pub fn parse_frame(text: &str) -> Result<Frame, FrameError> {
    let text = text.trim();
    if text.starts_with('{') {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| FrameError::Malformed(e.to_string()))?;
        return decode_event(&envelope.event, envelope.data);
    }

    let mut chars = text.chars();
    match chars.next() {
        Some('0') => Ok(Frame::Open),
        Some('2') => Ok(Frame::Ping),
        Some('1') | Some('3') | Some('6') => Ok(Frame::Ignored),
        Some('4') => parse_socket_packet(chars.as_str()),
        _ => Err(FrameError::Malformed(text.to_string())),
    }
}

/// Socket.IO packet carried inside an engine.io message.
fn parse_socket_packet(packet: &str) -> Result<Frame, FrameError> {
    match packet.chars().next() {
        Some('0') => Ok(Frame::Connected),
        Some('2') => {
            // Optional "/namespace," and ack id precede the JSON array.
            let start = packet
                .find('[')
                .ok_or_else(|| FrameError::Malformed(packet.to_string()))?;
            let args: Vec<serde_json::Value> = serde_json::from_str(&packet[start..])
                .map_err(|e| FrameError::Malformed(e.to_string()))?;
            let mut args = args.into_iter();
            let name = match args.next() {
                Some(serde_json::Value::String(name)) => name,
                _ => return Err(FrameError::Malformed(packet.to_string())),
            };
            decode_event(&name, args.next().unwrap_or(serde_json::Value::Null))
        }
        Some(_) => Ok(Frame::Ignored),
        None => Err(FrameError::Malformed("empty socket packet".to_string())),
    }
}

fn decode_event(name: &str, payload: serde_json::Value) -> Result<Frame, FrameError> {
    let payload_err = |e: serde_json::Error| FrameError::Payload {
        event: name.to_string(),
        message: e.to_string(),
    };
    match name {
        EVENT_MESSAGE_NEW => {
            if payload.is_null() {
                return Ok(Frame::Ignored);
            }
            let message: Message = serde_json::from_value(payload).map_err(payload_err)?;
            Ok(Frame::Event(RealtimeEvent::NewMessage(message)))
        }
        EVENT_MESSAGE_STATUS => {
            let p: StatusPayload = serde_json::from_value(payload).map_err(payload_err)?;
            let status = MessageStatus::parse(&p.status).ok_or_else(|| FrameError::Payload {
                event: name.to_string(),
                message: format!("unknown status {}", p.status),
            })?;
            Ok(Frame::Event(RealtimeEvent::StatusUpdate {
                message_id: p.message_id,
                status,
            }))
        }
        EVENT_UNREAD_UPDATE => {
            let p: UnreadPayload = serde_json::from_value(payload).map_err(payload_err)?;
            let jid = Jid::parse(&p.jid).map_err(|e| FrameError::Payload {
                event: name.to_string(),
                message: e.to_string(),
            })?;
            Ok(Frame::Event(RealtimeEvent::UnreadUpdate {
                jid,
                unread_count: p.unread_count,
            }))
        }
        _ => Ok(Frame::Ignored),
    }
}
