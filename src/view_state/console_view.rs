use std::collections::VecDeque;

use crate::format::window_title;

use super::{Composer, ConversationList, Timeline};

pub const HEADER_LOADING: &str = "Carregando...";

/// Name and avatar shown above the open conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHeader {
    pub name: String,
    pub avatar_url: Option<String>,
}

impl ChatHeader {
    pub fn loading() -> Self {
        Self {
            name: HEADER_LOADING.to_string(),
            avatar_url: None,
        }
    }
}

/// Everything a front end needs to draw the console.
#[derive(Debug, Clone)]
pub struct ConsoleView {
    pub list: ConversationList,
    pub timeline: Timeline,
    pub composer: Composer,
    pub header: Option<ChatHeader>,
    /// Whether the close confirmation (three exit paths) is showing.
    pub close_menu_open: bool,
    /// QR payload while the WhatsApp link is being paired.
    pub pairing_qr: Option<String>,
    brand: String,
    title: String,
    alerts: VecDeque<String>,
    notices: VecDeque<String>,
}

impl ConsoleView {
    pub fn new(brand: impl Into<String>) -> Self {
        let brand = brand.into();
        Self {
            list: ConversationList::new(),
            timeline: Timeline::new(),
            composer: Composer::default(),
            header: None,
            close_menu_open: false,
            pairing_qr: None,
            title: window_title(&brand, 0),
            brand,
            alerts: VecDeque::new(),
            notices: VecDeque::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_unread_total(&mut self, total: u32) {
        self.title = window_title(&self.brand, total);
    }

    /// Queue a blocking alert for the agent.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push_back(message.into());
    }

    pub fn alerts(&self) -> impl Iterator<Item = &String> {
        self.alerts.iter()
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        self.alerts.drain(..).collect()
    }

    /// Queue an informational line (listings, confirmations) that needs no
    /// acknowledgement.
    pub fn notice(&mut self, line: impl Into<String>) {
        self.notices.push_back(line.into());
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        self.notices.drain(..).collect()
    }

    /// Forget the open conversation.
    pub fn clear_chat(&mut self) {
        self.timeline.reset(None);
        self.header = None;
        self.close_menu_open = false;
        self.composer = Composer::default();
    }
}
