//! Status transitions, the close confirmation and deletion.

mod common;

use common::*;
use serde_json::json;

use zapdesk::adapters::mock::MockResponse;
use zapdesk::console::{DELETED, NOT_FOUND};
use zapdesk::error::{ConsoleError, WorkflowError};
use zapdesk::models::{ConversationStatus, Jid};
use zapdesk::view_state::{PLACEHOLDER_ACTIVE, PLACEHOLDER_CLOSED};
use zapdesk::workflow::{ClosePath, Transition, CLOSE_RESOLVED_TEXT};

fn status_url(jid: &str) -> String {
    format!("{}/status", conversation_url(jid))
}

async fn opened(raw_jid: &str) -> TestConsole {
    let mut t = TestConsole::signed_in();
    t.stub_three_conversations();
    t.console.initialize().await.unwrap();
    t.console.open_chat(raw_jid).await.unwrap();
    t
}

#[tokio::test]
async fn test_closing_opens_confirmation_first() {
    let mut t = opened(MARIA).await;
    t.http.clear_requests();

    let transition = t
        .console
        .update_status(MARIA, ConversationStatus::Closed)
        .await
        .unwrap();
    assert_eq!(transition, Transition::ConfirmClose);
    assert!(t.console.view().close_menu_open);
    assert_eq!(
        t.console.state().close.pending().map(Jid::as_str),
        Some(MARIA)
    );
    assert!(t.http.get_requests().is_empty());

    assert_eq!(t.console.cancel_close().as_ref().map(Jid::as_str), Some(MARIA));
    assert!(!t.console.view().close_menu_open);
}

#[tokio::test]
async fn test_resolved_close_sends_message_then_closes() {
    let mut t = opened(MARIA).await;
    t.http.set_method_response(
        "POST",
        &url("/send"),
        MockResponse::json(json!({"message": {"messageId": "C1"}})),
    );
    t.http
        .set_method_response("POST", &status_url(MARIA), MockResponse::json(json!({})));

    t.console
        .update_status(MARIA, ConversationStatus::Closed)
        .await
        .unwrap();
    t.console.close_conversation(ClosePath::Resolved).await.unwrap();

    let sent = t.http.requests_to("POST", "/send");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].json().unwrap()["textFormatted"],
        format!("*Ana:*\n{}", CLOSE_RESOLVED_TEXT)
    );
    let status = t.http.requests_to("POST", "/status");
    assert_eq!(status[0].json().unwrap(), json!({"status": "closed"}));

    let view = t.console.view();
    assert!(!view.close_menu_open);
    assert!(!view.composer.enabled);
    assert_eq!(view.composer.placeholder, PLACEHOLDER_CLOSED);
    assert!(view.timeline.contains("C1"));
    assert_eq!(t.console.state().tab(), ConversationStatus::Closed);
    assert!(t.console.state().close.pending().is_none());
    assert_eq!(t.row_names(), vec!["Ana"]);
}

#[tokio::test]
async fn test_silent_close_sends_nothing() {
    let mut t = opened(MARIA).await;
    t.http
        .set_method_response("POST", &status_url(MARIA), MockResponse::json(json!({})));

    t.console
        .update_status(MARIA, ConversationStatus::Closed)
        .await
        .unwrap();
    t.console.close_conversation(ClosePath::Silent).await.unwrap();

    assert!(t.http.requests_to("POST", "/send").is_empty());
    assert_eq!(t.http.requests_to("POST", "/status").len(), 1);
}

#[tokio::test]
async fn test_failed_canned_message_still_closes() {
    let mut t = opened(MARIA).await;
    t.http
        .set_method_response("POST", &url("/send"), MockResponse::offline());
    t.http
        .set_method_response("POST", &status_url(MARIA), MockResponse::json(json!({})));

    t.console
        .update_status(MARIA, ConversationStatus::Closed)
        .await
        .unwrap();
    t.console.close_conversation(ClosePath::Timeout).await.unwrap();

    assert_eq!(t.alerts(), vec!["Erro de conexão ao enviar mensagem"]);
    assert_eq!(t.console.state().tab(), ConversationStatus::Closed);
}

#[tokio::test]
async fn test_failed_status_update_keeps_confirmation_open() {
    let mut t = opened(MARIA).await;
    t.http.set_method_response(
        "POST",
        &status_url(MARIA),
        MockResponse::status_json(500, json!({"error": "Falha interna"})),
    );

    t.console
        .update_status(MARIA, ConversationStatus::Closed)
        .await
        .unwrap();
    assert!(t
        .console
        .close_conversation(ClosePath::Silent)
        .await
        .is_err());

    assert_eq!(t.alerts(), vec!["Erro ao fechar conversa: Falha interna"]);
    assert!(t.console.view().close_menu_open);
    assert_eq!(
        t.console.state().close.pending().map(Jid::as_str),
        Some(MARIA)
    );
    assert_eq!(t.console.state().tab(), ConversationStatus::Active);
}

#[tokio::test]
async fn test_close_without_pending_conversation() {
    let mut t = TestConsole::signed_in();
    let err = t
        .console
        .close_conversation(ClosePath::Resolved)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::Workflow(WorkflowError::NoPendingClose)
    ));
}

#[tokio::test]
async fn test_closed_cannot_go_back_to_queue() {
    let mut t = TestConsole::signed_in();
    t.stub_three_conversations();
    t.console.initialize().await.unwrap();
    t.http.clear_requests();

    let err = t
        .console
        .update_status(ANA, ConversationStatus::Queue)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::Workflow(WorkflowError::InvalidTransition { .. })
    ));
    assert!(t.http.get_requests().is_empty());
}

#[tokio::test]
async fn test_queue_to_active_applies_immediately() {
    let mut t = opened(JOAO).await;
    assert!(!t.console.view().composer.enabled);
    t.http
        .set_method_response("POST", &status_url(JOAO), MockResponse::json(json!({})));

    let transition = t
        .console
        .update_status(JOAO, ConversationStatus::Active)
        .await
        .unwrap();
    assert_eq!(transition, Transition::Immediate(ConversationStatus::Active));

    let status = t.http.requests_to("POST", "/status");
    assert_eq!(status[0].json().unwrap(), json!({"status": "active"}));
    assert!(t.console.view().composer.enabled);
    assert_eq!(t.console.view().composer.placeholder, PLACEHOLDER_ACTIVE);
    assert_eq!(
        t.console.state().status_of(&Jid::parse(JOAO).unwrap()),
        Some(ConversationStatus::Active)
    );
}

#[tokio::test]
async fn test_invalid_jid_alerts() {
    let mut t = TestConsole::signed_in();
    assert!(t
        .console
        .update_status("undefined", ConversationStatus::Queue)
        .await
        .is_err());
    assert_eq!(t.alerts(), vec!["Erro: Conversa inválida"]);
}

#[tokio::test]
async fn test_delete_open_conversation() {
    let mut t = opened(MARIA).await;
    t.http.set_method_response(
        "GET",
        &url(&format!("/conversation-id/{}", segment(MARIA))),
        MockResponse::json(json!({"success": true, "id": 42})),
    );
    t.http.set_method_response(
        "DELETE",
        &url("/conversations/42"),
        MockResponse::status(204),
    );
    t.stub_conversations(json!([conversation(ANA, "Ana", "closed", json!([]))]));

    t.console.delete_conversation(None).await.unwrap();

    assert_eq!(t.http.requests_to("DELETE", "/conversations/42").len(), 1);
    assert_eq!(t.alerts(), vec![DELETED]);
    assert!(t.console.state().current_chat().is_none());
    assert!(t.console.view().timeline.is_empty());
    assert!(t.row_names().is_empty());
}

#[tokio::test]
async fn test_delete_unknown_conversation() {
    let mut t = opened(MARIA).await;
    t.http.set_method_response(
        "GET",
        &url(&format!("/conversation-id/{}", segment(MARIA))),
        MockResponse::json(json!({"success": false})),
    );

    assert!(t.console.delete_conversation(Some(MARIA)).await.is_err());
    assert_eq!(t.alerts(), vec![NOT_FOUND]);
    assert!(t.http.requests_to("DELETE", "").is_empty());
    assert!(t.console.state().current_chat().is_some());
}

#[tokio::test]
async fn test_delete_without_conversation() {
    let mut t = TestConsole::signed_in();
    assert!(t.console.delete_conversation(None).await.is_err());
    assert_eq!(t.alerts(), vec!["Erro: Conversa inválida"]);
}
