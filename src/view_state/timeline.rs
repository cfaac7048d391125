//! Rendered message history of the open conversation.

use std::collections::HashMap;

use crate::format::format_time_12h;
use crate::models::{Jid, Message, MessageBody, MessageStatus};

pub const AUDIO_UNAVAILABLE: &str = "🎤 Áudio (arquivo não disponível)";
pub const STICKER_UNAVAILABLE: &str = "🖼️ Figurinha (arquivo não disponível)";

/// One rendered message.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub message: Message,
    /// Agent name for optimistic outgoing bubbles.
    pub author: Option<String>,
}

impl TimelineEntry {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            author: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.message.message_id
    }

    /// What the bubble shows: text, media URL, or the unavailable placeholder.
    pub fn content(&self) -> String {
        match &self.message.body {
            MessageBody::Text(text) => text.clone(),
            MessageBody::Sticker { url: Some(url) } => format!("[figurinha] {}", url),
            MessageBody::Sticker { url: None } => STICKER_UNAVAILABLE.to_string(),
            MessageBody::Audio { url: Some(url) } => format!("[áudio] {}", url),
            MessageBody::Audio { url: None } => AUDIO_UNAVAILABLE.to_string(),
        }
    }

    /// Single-line rendering: `09:05 AM  Você: Olá  (read)`.
    pub fn display_line(&self) -> String {
        let who = if self.message.from_me {
            self.author.as_deref().unwrap_or("Você")
        } else {
            "Cliente"
        };
        let mut line = format!(
            "{}  {}: {}",
            format_time_12h(self.message.timestamp),
            who,
            self.content()
        );
        if self.message.from_me {
            line.push_str(&format!("  ({})", self.message.status));
        }
        line
    }
}

/// Outcome of replacing a temporary id with the backend id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rekey {
    /// The entry now carries the backend id.
    Rekeyed,
    /// An entry with the backend id was already rendered; the temporary one
    /// was dropped.
    DroppedDuplicate,
    /// No entry with the temporary id exists.
    Missing,
}

/// Ordered, id-unique list of rendered messages.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    jid: Option<Jid>,
    entries: Vec<TimelineEntry>,
    /// Statuses reported before their message was rendered.
    early_statuses: HashMap<String, MessageStatus>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversation the timeline currently shows.
    pub fn jid(&self) -> Option<&Jid> {
        self.jid.as_ref()
    }

    /// Start over for another conversation (or none).
    pub fn reset(&mut self, jid: Option<Jid>) {
        self.jid = jid;
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.position(message_id).is_some()
    }

    pub fn get(&self, message_id: &str) -> Option<&TimelineEntry> {
        self.position(message_id).map(|i| &self.entries[i])
    }

    fn position(&self, message_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == message_id)
    }

    /// Append an entry unless its id is already rendered. Returns whether it
    /// was appended.
    pub fn render(&mut self, mut entry: TimelineEntry) -> bool {
        if self.contains(entry.id()) {
            return false;
        }
        if let Some(status) = self.early_statuses.remove(entry.id()) {
            entry.message.status = status;
        }
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, message_id: &str) -> Option<TimelineEntry> {
        self.position(message_id).map(|i| self.entries.remove(i))
    }

    /// Give the entry `temp_id` the id `real_id`, keeping its slot.
    pub fn rekey(&mut self, temp_id: &str, real_id: &str, status: MessageStatus) -> Rekey {
        let Some(index) = self.position(temp_id) else {
            return Rekey::Missing;
        };
        if temp_id != real_id && self.contains(real_id) {
            self.entries.remove(index);
            return Rekey::DroppedDuplicate;
        }
        let entry = &mut self.entries[index];
        entry.message.message_id = real_id.to_string();
        entry.message.status = self
            .early_statuses
            .remove(real_id)
            .map(|early| early.max(status))
            .unwrap_or(status);
        Rekey::Rekeyed
    }

    /// Update a rendered message's status. Statuses for ids not rendered yet
    /// are remembered and applied when the message shows up.
    pub fn set_status(&mut self, message_id: &str, status: MessageStatus) -> bool {
        match self.position(message_id) {
            Some(i) => {
                self.entries[i].message.status = status;
                true
            }
            None => {
                self.early_statuses.insert(message_id.to_string(), status);
                false
            }
        }
    }
}
