//! Favorite stickers, recent emojis and the sticker commands.

mod common;

use bytes::Bytes;
use common::*;
use serde_json::json;

use zapdesk::adapters::mock::MockResponse;
use zapdesk::console::{Command, Flow, ALREADY_FAVORITE, STICKER_SAVED};
use zapdesk::preferences::{content_hash, SAVED_STICKERS_KEY};
use zapdesk::traits::Response;

const RECEIVED: &str = "/stickers/3EB0A1B2.webp";
const SAVED: &str = "/saved/gato.webp";
const OTHER: &str = "/saved/cachorro.webp";

fn bytes(data: &'static [u8]) -> MockResponse {
    MockResponse::Success(Response::new(200, Bytes::from_static(data)))
}

/// Signed-in console with Maria open and sticker media on the backend.
async fn with_media() -> TestConsole {
    let mut t = TestConsole::signed_in();
    t.stub_three_conversations();
    t.http.set_method_response("GET", &url(RECEIVED), bytes(b"gato"));
    t.http.set_method_response("GET", &url(SAVED), bytes(b"gato"));
    t.http.set_method_response("GET", &url(OTHER), bytes(b"cachorro"));
    t.http.set_method_response(
        "POST",
        &url("/save-sticker"),
        MockResponse::json(json!({"url": SAVED, "filename": "gato.webp"})),
    );
    t.console.initialize().await.unwrap();
    t.console.open_chat(MARIA).await.unwrap();
    t
}

#[tokio::test]
async fn test_save_received_sticker() {
    let mut t = with_media().await;

    let added = t
        .console
        .save_received_sticker(RECEIVED, None)
        .await
        .unwrap();
    assert!(added);
    assert_eq!(t.alerts(), vec![STICKER_SAVED]);

    let save = &t.http.requests_to("POST", "/save-sticker")[0];
    assert_eq!(save.form_text("messageId").as_deref(), Some("3EB0A1B2"));

    let favorites = t.console.favorites();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].url, SAVED);
    assert_eq!(favorites[0].name.as_deref(), Some("gato.webp"));
    assert_eq!(favorites[0].hash, content_hash(b"gato"));
    assert!(t.store.raw(SAVED_STICKERS_KEY).unwrap().contains(SAVED));
}

#[tokio::test]
async fn test_same_content_is_not_saved_twice() {
    let mut t = with_media().await;
    t.console
        .save_received_sticker(RECEIVED, Some("3EB0A1B2"))
        .await
        .unwrap();
    t.alerts();
    t.http.clear_requests();

    let added = t
        .console
        .save_received_sticker(RECEIVED, Some("3EB0A1B2"))
        .await
        .unwrap();
    assert!(!added);
    assert_eq!(t.alerts(), vec![ALREADY_FAVORITE]);
    assert!(t.http.requests_to("POST", "/save-sticker").is_empty());
}

#[tokio::test]
async fn test_sticker_without_id_is_skipped() {
    let mut t = with_media().await;
    t.http
        .set_method_response("GET", &url("/media/x.png"), bytes(b"png"));

    let added = t
        .console
        .save_received_sticker("/media/x.png", None)
        .await
        .unwrap();
    assert!(!added);
    assert!(t.http.requests_to("POST", "/save-sticker").is_empty());
    assert!(t.console.favorites().is_empty());
}

#[tokio::test]
async fn test_catalog_keeps_favorites_only() {
    let mut t = with_media().await;
    t.console
        .save_received_sticker(RECEIVED, None)
        .await
        .unwrap();
    t.http.set_method_response(
        "GET",
        &url("/stickers-list"),
        MockResponse::json(json!({
            "success": true,
            "stickers": [
                {"url": OTHER},
                {"url": SAVED, "name": "gato.webp"},
                {"url": SAVED, "name": "gato.webp"},
            ],
        })),
    );

    let catalog = t.console.favorite_catalog().await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].url, SAVED);

    t.console.unfavorite(SAVED).unwrap();
    assert!(t.console.favorite_catalog().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_favorite_commands() {
    let mut t = with_media().await;
    t.console
        .save_received_sticker(RECEIVED, None)
        .await
        .unwrap();
    t.alerts();
    t.http.set_method_response(
        "GET",
        &url("/stickers-list"),
        MockResponse::json(json!({"success": true, "stickers": [{"url": SAVED, "name": "gato.webp"}]})),
    );
    t.http.set_method_response(
        "POST",
        &url("/send-sticker"),
        MockResponse::json(json!({"message": {"messageId": "ST9", "url": SAVED}})),
    );

    assert_eq!(t.console.execute(Command::Favorites).await.unwrap(), Flow::Continue);
    assert_eq!(t.console.view_mut().take_notices(), vec!["  1. gato.webp"]);

    t.console.execute(Command::SendFavorite(1)).await.unwrap();
    let upload = &t.http.requests_to("POST", "/send-sticker")[0];
    assert_eq!(upload.form_text("jid").as_deref(), Some(MARIA));
    assert!(t.console.view().timeline.contains("ST9"));

    t.console.execute(Command::SendFavorite(5)).await.unwrap();
    assert_eq!(t.alerts(), vec!["Sticker 5 não encontrado"]);
}

#[tokio::test]
async fn test_emoji_is_sent_and_remembered() {
    let mut t = with_media().await;
    t.http.set_method_response(
        "POST",
        &url("/send"),
        MockResponse::json(json!({"message": {"messageId": "E1"}})),
    );

    t.console.send_emoji("👍").await.unwrap();
    t.console.send_emoji("🎉").await.unwrap();
    t.console.send_emoji("👍").await.unwrap();

    assert_eq!(t.console.recent_emojis(), vec!["👍", "🎉"]);
    let sent = t.http.requests_to("POST", "/send");
    assert_eq!(sent[0].json().unwrap()["textFormatted"], "*Ana:*\n👍");

    t.console.clear_recent_emojis().unwrap();
    assert!(t.console.recent_emojis().is_empty());
}
