//! Backend client tests against a real HTTP server using wiremock.

use bytes::Bytes;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zapdesk::adapters::ReqwestHttpClient;
use zapdesk::api::BackendClient;
use zapdesk::error::{ConsoleError, NetworkError};
use zapdesk::models::{ConversationStatus, Jid, MessageBody, ProfilePicture};
use zapdesk::traits::MediaFetcher;

const TOKEN: &str = "test-auth-token";
const MARIA: &str = "5511999990001@s.whatsapp.net";
/// Path segment of MARIA, whether or not the `@` arrives encoded.
const MARIA_SEGMENT: &str = r"5511999990001(@|%40)s\.whatsapp\.net";

fn client(server: &MockServer) -> BackendClient<ReqwestHttpClient> {
    BackendClient::new(server.uri(), ReqwestHttpClient::new()).with_auth(TOKEN)
}

fn maria() -> Jid {
    Jid::parse(MARIA).unwrap()
}

#[tokio::test]
async fn test_send_text_posts_signed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(body_json(json!({"jid": MARIA, "textFormatted": "*Ana:*\nOlá"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": {"messageId": "BAE5"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sent = client(&server)
        .send_text(&maria(), "*Ana:*\nOlá")
        .await
        .unwrap();
    assert_eq!(sent.message_id.as_deref(), Some("BAE5"));
}

#[tokio::test]
async fn test_unauthorized_requires_reauth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token inválido"})))
        .mount(&server)
        .await;

    let err = client(&server).me().await.unwrap_err();
    assert!(err.requires_reauth());
}

#[tokio::test]
async fn test_backend_reason_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(format!("^/conversations/{}/status$", MARIA_SEGMENT)))
        .and(body_json(json!({"status": "queue"})))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "Conversa bloqueada"})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .update_status(&maria(), ConversationStatus::Queue)
        .await
        .unwrap_err();
    match err {
        ConsoleError::Network(NetworkError::HttpStatus { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Conversa bloqueada");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_conversation_decodes_mixed_messages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(format!("^/conversations/{}$", MARIA_SEGMENT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Maria",
            "status": "active",
            "messages": [
                {"messageId": "m1", "fromMe": false, "text": "Oi", "timestamp": 1714550000000i64},
                {"messageId": "m2", "fromMe": false, "type": "sticker",
                 "sticker": "/stickers/m2.webp", "timestamp": "1714550001000"},
                {"messageId": "m3", "fromMe": true, "type": "audio", "url": "undefined",
                 "timestamp": 1714550002000i64, "status": "read"},
            ],
        })))
        .mount(&server)
        .await;

    let conversation = client(&server).conversation(&maria()).await.unwrap();
    assert_eq!(conversation.jid, maria());
    assert_eq!(conversation.status, Some(ConversationStatus::Active));
    assert_eq!(conversation.messages.len(), 3);
    assert_eq!(
        conversation.messages[1].body,
        MessageBody::Sticker {
            url: Some("/stickers/m2.webp".to_string())
        }
    );
    assert_eq!(conversation.messages[1].timestamp, 1_714_550_001_000);
    assert_eq!(conversation.messages[2].body, MessageBody::Audio { url: None });
}

#[tokio::test]
async fn test_profile_picture_answers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(format!("^/update-profile-picture/{}$", MARIA_SEGMENT)))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(format!("^/update-profile-picture/{}$", MARIA_SEGMENT)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"img": "https://cdn/maria.jpg"})),
        )
        .mount(&server)
        .await;

    let api = client(&server);
    assert_eq!(
        api.profile_picture(&maria()).await.unwrap(),
        ProfilePicture::Generated
    );
    assert_eq!(
        api.profile_picture(&maria()).await.unwrap(),
        ProfilePicture::Url("https://cdn/maria.jpg".to_string())
    );
}

#[tokio::test]
async fn test_unread_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/unread-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalUnread": 7})))
        .mount(&server)
        .await;

    assert_eq!(client(&server).unread_count().await.unwrap(), 7);
}

#[tokio::test]
async fn test_send_audio_uploads_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send-audio"))
        .and(body_string_contains("filename=\"audio.webm\""))
        .and(body_string_contains(MARIA))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"messageId": "AU1", "audioUrl": "/audios/AU1.webm"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sent = client(&server)
        .send_audio(&maria(), Bytes::from_static(b"webm-bytes"))
        .await
        .unwrap();
    assert_eq!(sent.message_id.as_deref(), Some("AU1"));
    assert_eq!(sent.audio_url.as_deref(), Some("/audios/AU1.webm"));
}

#[tokio::test]
async fn test_media_fetch_resolves_relative_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/saved/gato.webp"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".to_vec()))
        .mount(&server)
        .await;

    let api = client(&server);
    let data = api.fetch("/saved/gato.webp").await.unwrap();
    assert_eq!(&data[..], b"RIFF");
    assert!(api.fetch("/saved/missing.webp").await.is_err());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let api = BackendClient::new("http://127.0.0.1:1", ReqwestHttpClient::new()).with_auth(TOKEN);
    let err = api.unread_count().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Network(ref net) if net.is_transport()));
    assert!(!err.requires_reauth());
}
