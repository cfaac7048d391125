//! Request and response bodies of the backend REST API.

use serde::{Deserialize, Serialize};

use super::{deserialize_flexible_id, deserialize_nullable_string, ConversationStatus, RoleSet};

/// Body of `POST /send`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextRequest<'a> {
    pub jid: &'a str,
    pub text_formatted: &'a str,
}

/// Body of `POST /conversations/:jid/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateRequest {
    pub status: ConversationStatus,
}

/// Body of `POST /mark-as-read`.
#[derive(Debug, Clone, Serialize)]
pub struct MarkReadRequest<'a> {
    pub jid: &'a str,
}

/// Error body the backend attaches to non-2xx answers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Identity of a sent message as reported by the send endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessageRef {
    #[serde(default, deserialize_with = "deserialize_flexible_id")]
    pub message_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Response of the send endpoints: `{message: {...}}`, or flat for audio.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    message: Option<SentMessageRef>,
    #[serde(flatten)]
    flat: SentMessageRef,
}

impl SendResponse {
    /// The nested reference when it carries an id, the flat one otherwise.
    pub fn sent(&self) -> SentMessageRef {
        match &self.message {
            Some(nested) if nested.message_id.is_some() => nested.clone(),
            _ => self.flat.clone(),
        }
    }
}

/// `GET /me`.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub username: String,
    #[serde(default)]
    pub role: Vec<u8>,
}

impl MeResponse {
    pub fn roles(&self) -> RoleSet {
        RoleSet::from_codes(&self.role)
    }
}

/// WhatsApp link state reported by `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Reconnecting,
    Disconnected,
    Unknown(String),
}

impl ConnectionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "conectado" => ConnectionStatus::Connected,
            "reconectando" => ConnectionStatus::Reconnecting,
            "desconectado" => ConnectionStatus::Disconnected,
            other => ConnectionStatus::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub status: String,
}

/// `GET /qr`.
#[derive(Debug, Clone, Deserialize)]
pub struct QrResponse {
    pub qr: String,
}

/// `GET /unread-count`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    #[serde(default)]
    pub total_unread: u32,
}

/// One entry of the server-side sticker catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogSticker {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /stickers-list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StickersListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub stickers: Vec<CatalogSticker>,
}

/// `POST /save-sticker`.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedStickerResponse {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// `GET /conversation-id/:jid`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationIdResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "deserialize_flexible_id")]
    pub id: Option<String>,
}

/// Where the avatar of a conversation comes from after a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfilePicture {
    /// `204 No Content`: nothing on file, use a generated avatar.
    Generated,
    /// JSON answer with an `img` URL.
    Url(String),
    /// Any other content: the picture is served from `/profile-pics/<jid>.jpg`.
    Stored,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProfilePictureBody {
    #[serde(default)]
    pub img: Option<String>,
}
