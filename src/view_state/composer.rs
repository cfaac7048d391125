//! Message input state.

use crate::models::ConversationStatus;

pub const PLACEHOLDER_ACTIVE: &str = "Mensagem";
pub const PLACEHOLDER_QUEUE: &str = "Conversa em fila - não pode enviar mensagens";
pub const PLACEHOLDER_CLOSED: &str = "Esta conversa foi encerrada";

/// Input is enabled only while the conversation is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    pub enabled: bool,
    pub placeholder: &'static str,
}

impl Default for Composer {
    fn default() -> Self {
        Self::for_status(Some(ConversationStatus::Active))
    }
}

impl Composer {
    /// A conversation without a known status keeps the input usable.
    pub fn for_status(status: Option<ConversationStatus>) -> Self {
        match status {
            Some(ConversationStatus::Closed) => Self {
                enabled: false,
                placeholder: PLACEHOLDER_CLOSED,
            },
            Some(ConversationStatus::Queue) => Self {
                enabled: false,
                placeholder: PLACEHOLDER_QUEUE,
            },
            Some(ConversationStatus::Active) | None => Self {
                enabled: true,
                placeholder: PLACEHOLDER_ACTIVE,
            },
        }
    }
}
