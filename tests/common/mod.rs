//! Common test utilities for integration tests.
//!
//! A [`TestConsole`] wires a `Console` to a [`MockHttpClient`] answering on
//! `http://backend` and a [`MemoryStore`] seeded with a token.
//!
//! # Example
//!
//! ```ignore
//! let t = TestConsole::signed_in();
//! t.stub_conversations(json!([conversation(MARIA, "Maria", "active", json!([]))]));
//! t.console.initialize().await?;
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};

use zapdesk::adapters::mock::{MemoryStore, MockHttpClient, MockResponse};
use zapdesk::config::ConsoleConfig;
use zapdesk::console::Console;
use zapdesk::session::TOKEN_KEY;

pub const BASE: &str = "http://backend";
pub const TOKEN: &str = "test-token-123";
pub const MARIA: &str = "5511999990001@s.whatsapp.net";
pub const JOAO: &str = "5511999990002@s.whatsapp.net";
pub const ANA: &str = "5511999990003@s.whatsapp.net";

pub fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

/// Jid as it appears in a request path.
pub fn segment(jid: &str) -> String {
    urlencoding::encode(jid).into_owned()
}

pub fn conversation_url(jid: &str) -> String {
    url(&format!("/conversations/{}", segment(jid)))
}

pub fn test_config() -> ConsoleConfig {
    ConsoleConfig::default().with_base_url(BASE)
}

pub fn message(id: &str, jid: &str, from_me: bool, text: &str) -> Value {
    json!({
        "messageId": id,
        "jid": jid,
        "fromMe": from_me,
        "text": text,
        "timestamp": 1_714_550_000_000i64,
    })
}

pub fn conversation(jid: &str, name: &str, status: &str, messages: Value) -> Value {
    json!({
        "jid": jid,
        "name": name,
        "status": status,
        "messages": messages,
    })
}

pub struct TestConsole {
    pub console: Console<MockHttpClient>,
    pub http: MockHttpClient,
    pub store: MemoryStore,
}

impl TestConsole {
    /// Console with a stored token and a backend answering the ambient
    /// endpoints (`/me`, `/unread-count`, avatars, mark-as-read).
    pub fn signed_in() -> Self {
        let t = Self::with_store(MemoryStore::with_entries([(TOKEN_KEY, TOKEN)]));
        t.stub_backend();
        t
    }

    /// Answer the ambient endpoints and return an empty conversation list.
    pub fn stub_backend(&self) {
        self.http.set_response(
            &url("/me"),
            MockResponse::json(json!({"username": "ana", "role": [4]})),
        );
        self.http
            .set_response(&url("/unread-count"), MockResponse::json(json!({"totalUnread": 0})));
        self.http.set_response(
            &url("/update-profile-picture/"),
            MockResponse::status(204),
        );
        self.http.set_response(&url("/mark-as-read"), MockResponse::json(json!({})));
        self.stub_conversations(json!([]));
    }

    pub fn signed_out() -> Self {
        Self::with_store(MemoryStore::new())
    }

    fn with_store(store: MemoryStore) -> Self {
        let http = MockHttpClient::new();
        let console = Console::new(&test_config(), http.clone(), Arc::new(store.clone()))
            .expect("console");
        Self {
            console,
            http,
            store,
        }
    }

    pub fn stub_conversations(&self, list: Value) {
        self.http
            .set_method_response("GET", &url("/conversations"), MockResponse::json(list));
    }

    pub fn stub_conversation(&self, conversation: Value) {
        let jid = conversation["jid"].as_str().expect("jid").to_string();
        self.http.set_method_response(
            "GET",
            &conversation_url(&jid),
            MockResponse::json(conversation),
        );
    }

    pub fn stub_unread(&self, total: u32) {
        self.http
            .set_response(&url("/unread-count"), MockResponse::json(json!({"totalUnread": total})));
    }

    /// List with Maria (active), João (queue) and Ana (closed); each
    /// conversation also answers `GET /conversations/:jid`.
    pub fn stub_three_conversations(&self) {
        let maria = conversation(
            MARIA,
            "Maria",
            "active",
            json!([message("m1", MARIA, false, "Oi"), message("m2", MARIA, false, "Tudo bem?")]),
        );
        let joao = conversation(JOAO, "João", "queue", json!([message("j1", JOAO, false, "Olá")]));
        let ana = conversation(ANA, "Ana", "closed", json!([]));
        self.stub_conversations(json!([maria.clone(), joao.clone(), ana.clone()]));
        self.stub_conversation(maria);
        self.stub_conversation(joao);
        self.stub_conversation(ana);
    }

    pub fn alerts(&mut self) -> Vec<String> {
        self.console.view_mut().take_alerts()
    }

    pub fn timeline_ids(&self) -> Vec<String> {
        self.console
            .view()
            .timeline
            .entries()
            .iter()
            .map(|e| e.id().to_string())
            .collect()
    }

    pub fn row_names(&self) -> Vec<String> {
        self.console
            .view()
            .list
            .rows()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }
}
