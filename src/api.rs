//! Typed client for the backend REST API.
//!
//! Every call attaches `Authorization: Bearer <token>` when a token is set.
//! Status handling is uniform:
//!
//! - `401` becomes [`AuthError::Unauthorized`], which ends the session
//! - any other non-2xx becomes [`NetworkError::HttpStatus`] carrying the
//!   backend's `{"error": "..."}` reason (empty when absent)
//! - an undecodable body becomes [`NetworkError::InvalidResponse`]

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{AuthError, ConsoleError, ConsoleResult, NetworkError};
use crate::models::payloads::ProfilePictureBody;
use crate::models::{
    CatalogSticker, ConnectionStatus, Conversation, ConversationIdResponse, ConversationRecord,
    ConversationStatus, ErrorBody, Jid, MarkReadRequest, MeResponse, ProfilePicture, QrResponse,
    SavedStickerResponse, SendResponse, SendTextRequest, SentMessageRef, StatusResponse,
    StatusUpdateRequest, StickersListResponse, UnreadCountResponse,
};
use crate::traits::{Headers, HttpClient, MediaFetcher, MultipartField, Response};

/// Default backend URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// File name the audio recorder uploads under.
pub const AUDIO_FILENAME: &str = "audio.webm";
pub const AUDIO_MIME: &str = "audio/webm";

pub struct BackendClient<H: HttpClient> {
    base_url: String,
    http: H,
    auth_token: Option<String>,
}

impl<H: HttpClient> BackendClient<H> {
    pub fn new(base_url: impl Into<String>, http: H) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            auth_token: None,
        }
    }

    /// Set the authentication token for Bearer auth.
    pub fn with_auth(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token;
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path or an already absolute URL.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(ref token) = self.auth_token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }

    fn json_headers(&self) -> Headers {
        let mut headers = self.headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    fn jid_segment(jid: &Jid) -> String {
        urlencoding::encode(jid.as_str()).into_owned()
    }

    /// Map status codes onto the error taxonomy.
    fn check(response: Response, path: &str) -> ConsoleResult<Response> {
        if response.status == 401 {
            return Err(AuthError::Unauthorized {
                endpoint: path.to_string(),
            }
            .into());
        }
        if !response.is_success() {
            let message = response
                .json::<ErrorBody>()
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_default();
            debug!("{} answered {}: {:?}", path, response.status, message);
            return Err(NetworkError::HttpStatus {
                status: response.status,
                message,
            }
            .into());
        }
        Ok(response)
    }

    fn decode<T: DeserializeOwned>(response: &Response) -> ConsoleResult<T> {
        response.json::<T>().map_err(|e| {
            ConsoleError::Network(NetworkError::InvalidResponse {
                message: e.to_string(),
            })
        })
    }

    async fn get_raw(&self, path: &str) -> ConsoleResult<Response> {
        let url = self.resolve_url(path);
        let response = self
            .http
            .get(&url, &self.headers())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        Self::check(response, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConsoleResult<T> {
        let response = self.get_raw(path).await?;
        Self::decode(&response)
    }

    async fn post_raw<B: Serialize>(&self, path: &str, body: &B) -> ConsoleResult<Response> {
        let url = self.resolve_url(path);
        let body = serde_json::to_string(body)?;
        let response = self
            .http
            .post(&url, &body, &self.json_headers())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        Self::check(response, path)
    }

    async fn post_multipart_raw(
        &self,
        path: &str,
        fields: Vec<MultipartField>,
    ) -> ConsoleResult<Response> {
        let url = self.resolve_url(path);
        let response = self
            .http
            .post_multipart(&url, fields, &self.headers())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        Self::check(response, path)
    }

    /// `GET /status`
    pub async fn connection_status(&self) -> ConsoleResult<ConnectionStatus> {
        let body: StatusResponse = self.get_json("/status").await?;
        Ok(ConnectionStatus::parse(&body.status))
    }

    /// `GET /qr`
    pub async fn qr_code(&self) -> ConsoleResult<String> {
        let body: QrResponse = self.get_json("/qr").await?;
        Ok(body.qr)
    }

    /// `GET /me`
    pub async fn me(&self) -> ConsoleResult<MeResponse> {
        self.get_json("/me").await
    }

    /// `GET /conversations`, undecoded so the list filter can see malformed rows.
    pub async fn conversations(&self) -> ConsoleResult<Vec<ConversationRecord>> {
        self.get_json("/conversations").await
    }

    /// `GET /conversations/:jid`
    pub async fn conversation(&self, jid: &Jid) -> ConsoleResult<Conversation> {
        let path = format!("/conversations/{}", Self::jid_segment(jid));
        let record: ConversationRecord = self.get_json(&path).await?;
        match Conversation::try_from(record.clone()) {
            Ok(conversation) => Ok(conversation),
            // Some backends omit the jid in single-conversation answers.
            Err(_) => Conversation::try_from(ConversationRecord {
                jid: Some(jid.to_string()),
                ..record
            }),
        }
    }

    /// `POST /conversations/:jid/status`
    pub async fn update_status(&self, jid: &Jid, status: ConversationStatus) -> ConsoleResult<()> {
        let path = format!("/conversations/{}/status", Self::jid_segment(jid));
        self.post_raw(&path, &StatusUpdateRequest { status }).await?;
        Ok(())
    }

    /// `GET /conversation-id/:jid`
    pub async fn conversation_id(&self, jid: &Jid) -> ConsoleResult<ConversationIdResponse> {
        let path = format!("/conversation-id/{}", Self::jid_segment(jid));
        self.get_json(&path).await
    }

    /// `DELETE /conversations/:id`
    pub async fn delete_conversation(&self, id: &str) -> ConsoleResult<()> {
        let path = format!("/conversations/{}", urlencoding::encode(id));
        let url = self.resolve_url(&path);
        let response = self
            .http
            .delete(&url, &self.headers())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        Self::check(response, &path)?;
        Ok(())
    }

    /// `POST /send` with the already signed text.
    pub async fn send_text(&self, jid: &Jid, text_formatted: &str) -> ConsoleResult<SentMessageRef> {
        let response = self
            .post_raw(
                "/send",
                &SendTextRequest {
                    jid: jid.as_str(),
                    text_formatted,
                },
            )
            .await?;
        Ok(Self::decode::<SendResponse>(&response)?.sent())
    }

    /// `POST /send-sticker` (multipart `sticker`, `jid`)
    pub async fn send_sticker(
        &self,
        jid: &Jid,
        filename: &str,
        mime: &str,
        data: Bytes,
    ) -> ConsoleResult<SentMessageRef> {
        let fields = vec![
            MultipartField::file("sticker", filename, mime, data),
            MultipartField::text("jid", jid.as_str()),
        ];
        let response = self.post_multipart_raw("/send-sticker", fields).await?;
        Ok(Self::decode::<SendResponse>(&response)?.sent())
    }

    /// `POST /send-audio` (multipart `audio` named `audio.webm`, `jid`)
    pub async fn send_audio(&self, jid: &Jid, data: Bytes) -> ConsoleResult<SentMessageRef> {
        let fields = vec![
            MultipartField::file("audio", AUDIO_FILENAME, AUDIO_MIME, data),
            MultipartField::text("jid", jid.as_str()),
        ];
        let response = self.post_multipart_raw("/send-audio", fields).await?;
        Ok(Self::decode::<SendResponse>(&response)?.sent())
    }

    /// `POST /mark-as-read`
    pub async fn mark_as_read(&self, jid: &Jid) -> ConsoleResult<()> {
        self.post_raw("/mark-as-read", &MarkReadRequest { jid: jid.as_str() })
            .await?;
        Ok(())
    }

    /// `GET /unread-count`
    pub async fn unread_count(&self) -> ConsoleResult<u32> {
        let body: UnreadCountResponse = self.get_json("/unread-count").await?;
        Ok(body.total_unread)
    }

    /// `GET /stickers-list`
    pub async fn stickers_list(&self) -> ConsoleResult<Vec<CatalogSticker>> {
        let body: StickersListResponse = self.get_json("/stickers-list").await?;
        Ok(body.stickers)
    }

    /// `POST /save-sticker` (multipart `messageId`)
    pub async fn save_sticker(&self, message_id: &str) -> ConsoleResult<SavedStickerResponse> {
        let fields = vec![MultipartField::text("messageId", message_id)];
        let response = self.post_multipart_raw("/save-sticker", fields).await?;
        Self::decode(&response)
    }

    /// `GET /update-profile-picture/:jid`
    pub async fn profile_picture(&self, jid: &Jid) -> ConsoleResult<ProfilePicture> {
        let path = format!("/update-profile-picture/{}", Self::jid_segment(jid));
        let response = self.get_raw(&path).await?;
        if response.status == 204 {
            return Ok(ProfilePicture::Generated);
        }
        if response.is_json() {
            let body: ProfilePictureBody = Self::decode(&response)?;
            return Ok(body
                .img
                .filter(|img| !img.is_empty())
                .map(ProfilePicture::Url)
                .unwrap_or(ProfilePicture::Stored));
        }
        Ok(ProfilePicture::Stored)
    }

    /// `POST /logout`
    pub async fn logout(&self) -> ConsoleResult<()> {
        self.post_raw("/logout", &serde_json::json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl<H: HttpClient> MediaFetcher for BackendClient<H> {
    async fn fetch(&self, url: &str) -> Result<Bytes, NetworkError> {
        let url = self.resolve_url(url);
        let response = self
            .http
            .get(&url, &self.headers())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        if !response.is_success() {
            return Err(NetworkError::HttpStatus {
                status: response.status,
                message: format!("media fetch failed for {}", url),
            });
        }
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use serde_json::json;

    const BASE: &str = "http://backend";

    fn client(http: MockHttpClient) -> BackendClient<MockHttpClient> {
        BackendClient::new(format!("{}/", BASE), http).with_auth("tok")
    }

    fn jid() -> Jid {
        Jid::parse("5511999@s.whatsapp.net").unwrap()
    }

    #[test]
    fn test_resolve_url() {
        let api = client(MockHttpClient::new());
        assert_eq!(api.resolve_url("/s/a.webp"), "http://backend/s/a.webp");
        assert_eq!(api.resolve_url("s/a.webp"), "http://backend/s/a.webp");
        assert_eq!(api.resolve_url("https://cdn/x"), "https://cdn/x");
    }

    #[tokio::test]
    async fn test_bearer_header_attached() {
        let http = MockHttpClient::new();
        http.set_response(
            "http://backend/me",
            MockResponse::json(json!({"username": "ana", "role": [1]})),
        );
        let api = client(http.clone());
        let me = api.me().await.unwrap();
        assert_eq!(me.username, "ana");
        let request = &http.get_requests()[0];
        assert_eq!(request.headers.get("Authorization").unwrap(), "Bearer tok");
    }

    #[tokio::test]
    async fn test_401_is_auth_error() {
        let http = MockHttpClient::new();
        http.set_response("http://backend/conversations", MockResponse::status(401));
        let err = client(http).conversations().await.unwrap_err();
        assert!(err.requires_reauth());
    }

    #[tokio::test]
    async fn test_backend_reason_is_kept() {
        let http = MockHttpClient::new();
        http.set_response(
            "http://backend/send",
            MockResponse::status_json(400, json!({"error": "Chat não encontrado"})),
        );
        let err = client(http).send_text(&jid(), "*Ana:*\nOi").await.unwrap_err();
        match err {
            ConsoleError::Network(NetworkError::HttpStatus { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Chat não encontrado");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_text_body_and_id() {
        let http = MockHttpClient::new();
        http.set_response(
            "http://backend/send",
            MockResponse::json(json!({"message": {"messageId": "3EB0"}})),
        );
        let api = client(http.clone());
        let sent = api.send_text(&jid(), "*Ana:*\nOi").await.unwrap();
        assert_eq!(sent.message_id.as_deref(), Some("3EB0"));

        let body = http.requests_to("POST", "/send")[0].json().unwrap();
        assert_eq!(body["jid"], "5511999@s.whatsapp.net");
        assert_eq!(body["textFormatted"], "*Ana:*\nOi");
    }

    #[tokio::test]
    async fn test_send_audio_multipart() {
        let http = MockHttpClient::new();
        http.set_response(
            "http://backend/send-audio",
            MockResponse::json(json!({"messageId": "AUD", "url": "/a.webm"})),
        );
        let api = client(http.clone());
        let sent = api
            .send_audio(&jid(), Bytes::from_static(b"opus"))
            .await
            .unwrap();
        assert_eq!(sent.message_id.as_deref(), Some("AUD"));
        let request = &http.requests_to("POST", "/send-audio")[0];
        assert_eq!(
            request.form_text("jid").as_deref(),
            Some("5511999@s.whatsapp.net")
        );
    }

    #[tokio::test]
    async fn test_profile_picture_variants() {
        let http = MockHttpClient::new();
        let api = client(http.clone());
        let path = "http://backend/update-profile-picture/5511999%40s.whatsapp.net";

        http.set_response(path, MockResponse::status(204));
        assert_eq!(api.profile_picture(&jid()).await.unwrap(), ProfilePicture::Generated);

        http.set_response(path, MockResponse::json(json!({"img": "https://pps/x.jpg"})));
        assert_eq!(
            api.profile_picture(&jid()).await.unwrap(),
            ProfilePicture::Url("https://pps/x.jpg".to_string())
        );

        http.set_response(path, MockResponse::status(200));
        assert_eq!(api.profile_picture(&jid()).await.unwrap(), ProfilePicture::Stored);
    }

    #[tokio::test]
    async fn test_conversation_fills_missing_jid() {
        let http = MockHttpClient::new();
        http.set_response(
            "http://backend/conversations/5511999%40s.whatsapp.net",
            MockResponse::json(json!({"name": "Maria", "status": "queue", "messages": []})),
        );
        let conv = client(http).conversation(&jid()).await.unwrap();
        assert_eq!(conv.jid, jid());
        assert_eq!(conv.status, Some(ConversationStatus::Queue));
    }

    #[tokio::test]
    async fn test_media_fetch_errors_on_404() {
        let http = MockHttpClient::new();
        http.set_response("http://backend/stickers/x.webp", MockResponse::status(404));
        let result = client(http).fetch("/stickers/x.webp").await;
        assert!(matches!(result, Err(NetworkError::HttpStatus { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_offline_is_transport_error() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::offline());
        let err = client(http).unread_count().await.unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::Network(NetworkError::ConnectionFailed { .. })
        ));
    }
}
