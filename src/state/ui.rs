//! Session-wide UI state.
//!
//! Everything the console mutates between events that is not part of the
//! rendered view: which conversation is open, which tab is shown, header and
//! history caches, the close confirmation, and the ids sent this session.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{SentIdCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::models::{ConversationStatus, Jid};
use crate::reconcile::TempIdGenerator;
use crate::view_state::ChatHeader;
use crate::workflow::CloseConfirmation;

#[derive(Debug, Clone)]
pub struct UiState {
    /// Conversation open in the timeline.
    current_chat: Option<Jid>,

    /// Tab filtering the conversation list.
    tab: ConversationStatus,

    /// Last header shown per conversation, reused while reopening.
    headers: HashMap<Jid, ChatHeader>,

    /// History length already rendered per conversation.
    known_counts: HashMap<Jid, usize>,

    /// Last status seen per conversation.
    statuses: HashMap<Jid, ConversationStatus>,

    pub close: CloseConfirmation,
    pub sent_ids: SentIdCache,
    temp_ids: TempIdGenerator,
    unread_total: u32,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl UiState {
    pub fn new(sent_id_ttl: Duration, sent_id_capacity: usize) -> Self {
        Self {
            current_chat: None,
            tab: ConversationStatus::Active,
            headers: HashMap::new(),
            known_counts: HashMap::new(),
            statuses: HashMap::new(),
            close: CloseConfirmation::default(),
            sent_ids: SentIdCache::new(sent_id_ttl, sent_id_capacity),
            temp_ids: TempIdGenerator::new(),
            unread_total: 0,
        }
    }

    pub fn current_chat(&self) -> Option<&Jid> {
        self.current_chat.as_ref()
    }

    /// Whether `jid` is still the open conversation.
    pub fn is_open(&self, jid: &Jid) -> bool {
        self.current_chat.as_ref() == Some(jid)
    }

    pub fn open_chat(&mut self, jid: Jid) {
        self.current_chat = Some(jid);
    }

    pub fn close_chat(&mut self) -> Option<Jid> {
        self.current_chat.take()
    }

    pub fn tab(&self) -> ConversationStatus {
        self.tab
    }

    pub fn set_tab(&mut self, tab: ConversationStatus) {
        self.tab = tab;
    }

    pub fn header(&self, jid: &Jid) -> Option<&ChatHeader> {
        self.headers.get(jid)
    }

    pub fn cache_header(&mut self, jid: Jid, header: ChatHeader) {
        self.headers.insert(jid, header);
    }

    pub fn known_count(&self, jid: &Jid) -> usize {
        self.known_counts.get(jid).copied().unwrap_or(0)
    }

    pub fn set_known_count(&mut self, jid: Jid, count: usize) {
        self.known_counts.insert(jid, count);
    }

    pub fn status_of(&self, jid: &Jid) -> Option<ConversationStatus> {
        self.statuses.get(jid).copied()
    }

    pub fn record_status(&mut self, jid: Jid, status: ConversationStatus) {
        self.statuses.insert(jid, status);
    }

    pub fn next_temp_id(&mut self, now_ms: i64) -> String {
        self.temp_ids.next_id(now_ms)
    }

    pub fn unread_total(&self) -> u32 {
        self.unread_total
    }

    pub fn set_unread_total(&mut self, total: u32) {
        self.unread_total = total;
    }

    /// Drop everything tied to `jid` (after the conversation is deleted).
    pub fn forget(&mut self, jid: &Jid) {
        self.headers.remove(jid);
        self.known_counts.remove(jid);
        self.statuses.remove(jid);
        if self.is_open(jid) {
            self.current_chat = None;
        }
    }
}
