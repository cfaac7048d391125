use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Jid, Message};
use crate::error::ConsoleError;

/// Triage state of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Queue,
    Closed,
}

impl ConversationStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(ConversationStatus::Active),
            "queue" => Some(ConversationStatus::Queue),
            "closed" => Some(ConversationStatus::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Queue => "queue",
            ConversationStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A conversation as listed or fetched from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub jid: Jid,
    /// Display name; falls back to the jid.
    pub name: String,
    pub profile_image_url: Option<String>,
    /// `None` when the backend sent no (or an unknown) status. Such
    /// conversations belong to no tab.
    pub status: Option<ConversationStatus>,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Wire shape of a conversation, before the jid guard runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    #[serde(default)]
    pub jid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "img")]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
}

impl TryFrom<ConversationRecord> for Conversation {
    type Error = ConsoleError;

    fn try_from(record: ConversationRecord) -> Result<Self, Self::Error> {
        let jid = Jid::parse(record.jid.as_deref().unwrap_or_default())?;
        let name = record
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| jid.to_string());
        Ok(Conversation {
            name,
            profile_image_url: record.profile_image_url.filter(|u| !u.is_empty()),
            status: record.status.as_deref().and_then(ConversationStatus::parse),
            messages: record.messages.unwrap_or_default(),
            jid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&ConversationStatus::Queue).unwrap(),
            "\"queue\""
        );
        assert_eq!(ConversationStatus::parse("closed"), Some(ConversationStatus::Closed));
        assert_eq!(ConversationStatus::parse("archived"), None);
    }

    #[test]
    fn test_record_conversion() {
        let record: ConversationRecord = serde_json::from_str(
            r#"{"jid":"a@s.whatsapp.net","img":"/p.jpg","status":"active","messages":[{"messageId":"1","text":"oi"}]}"#,
        )
        .unwrap();
        let conv = Conversation::try_from(record).unwrap();
        assert_eq!(conv.name, "a@s.whatsapp.net");
        assert_eq!(conv.profile_image_url.as_deref(), Some("/p.jpg"));
        assert_eq!(conv.status, Some(ConversationStatus::Active));
        assert_eq!(conv.messages.len(), 1);
    }

    #[test]
    fn test_record_without_jid_is_rejected() {
        let record: ConversationRecord = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert!(matches!(
            Conversation::try_from(record),
            Err(ConsoleError::InvalidJid(_))
        ));
    }
}
