use std::fmt;

use serde::Deserialize;

use super::{deserialize_flexible_id, Jid};

/// Delivery status of an outgoing message. Display-only; ordered by progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum MessageStatus {
    #[default]
    Pending,
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(MessageStatus::Pending),
            "sent" => Some(MessageStatus::Sent),
            "delivered" => Some(MessageStatus::Delivered),
            "read" => Some(MessageStatus::Read),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of a message. Text and media URL are mutually exclusive by type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    /// `url` is `None` when the backend lost the media.
    Sticker { url: Option<String> },
    Audio { url: Option<String> },
}

impl MessageBody {
    pub fn text(&self) -> Option<&str> {
        match self {
            MessageBody::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn media_url(&self) -> Option<&str> {
        match self {
            MessageBody::Sticker { url } | MessageBody::Audio { url } => url.as_deref(),
            MessageBody::Text(_) => None,
        }
    }
}

/// A chat message as the backend reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawMessage")]
pub struct Message {
    /// Backend id, or `temp-<ms>` for an optimistic local echo.
    pub message_id: String,
    /// Conversation the message belongs to. Missing inside history payloads.
    pub jid: Option<Jid>,
    pub from_me: bool,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub status: MessageStatus,
    pub body: MessageBody,
}

impl Message {
    pub fn text(
        message_id: impl Into<String>,
        jid: Jid,
        from_me: bool,
        text: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            jid: Some(jid),
            from_me,
            timestamp,
            status: MessageStatus::Pending,
            body: MessageBody::Text(text.into()),
        }
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_body(mut self, body: MessageBody) -> Self {
        self.body = body;
        self
    }

    /// Text shown in the conversation list preview. Media has none.
    pub fn preview_source(&self) -> Option<&str> {
        self.body.text()
    }

    pub fn is_temporary(&self) -> bool {
        self.message_id.starts_with("temp-")
    }
}

/// Wire shape of a message. Several historical field names carry the media URL.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    #[serde(default, deserialize_with = "deserialize_flexible_id")]
    message_id: Option<String>,
    #[serde(default)]
    jid: Option<String>,
    #[serde(default)]
    from_me: Option<bool>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    sticker: Option<String>,
    #[serde(default)]
    content_url: Option<String>,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    timestamp: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<String>,
}

fn usable_url(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty() && url != "undefined")
}

/// Accepts epoch milliseconds as number or numeric string, or an RFC 3339 date.
fn parse_timestamp(value: Option<serde_json::Value>) -> i64 {
    match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Some(serde_json::Value::String(s)) => s.parse::<i64>().unwrap_or_else(|_| {
            chrono::DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.timestamp_millis())
                .unwrap_or_default()
        }),
        _ => 0,
    }
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        let timestamp = parse_timestamp(raw.timestamp);
        let body = match raw.kind.as_deref() {
            Some("sticker") => MessageBody::Sticker {
                url: usable_url([raw.url, raw.sticker, raw.content_url]),
            },
            Some("audio") => MessageBody::Audio {
                url: usable_url([raw.url, raw.audio_url]),
            },
            _ => MessageBody::Text(raw.text.unwrap_or_default()),
        };
        Message {
            message_id: raw
                .message_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("msg-{}", timestamp)),
            jid: raw.jid.as_deref().and_then(|j| Jid::parse(j).ok()),
            from_me: raw.from_me.unwrap_or(false),
            timestamp,
            status: raw
                .status
                .as_deref()
                .and_then(MessageStatus::parse)
                .unwrap_or_default(),
            body,
        }
    }
}
