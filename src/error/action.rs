//! Failures of agent-initiated actions.
//!
//! These are the only errors the console shows to the agent directly: the
//! formatted text ends up in the view's alert queue.

use thiserror::Error;

use super::network::NetworkError;

/// An action the agent triggered explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAction {
    SendMessage,
    SendSticker,
    SendAudio,
    SaveSticker,
    UpdateStatus,
    CloseConversation,
    DeleteConversation,
}

impl UserAction {
    /// Verb phrase used inside alert texts.
    pub fn label(&self) -> &'static str {
        match self {
            UserAction::SendMessage => "enviar mensagem",
            UserAction::SendSticker => "enviar sticker",
            UserAction::SendAudio => "enviar áudio",
            UserAction::SaveSticker => "salvar sticker",
            UserAction::UpdateStatus => "atualizar status",
            UserAction::CloseConversation => "fechar conversa",
            UserAction::DeleteConversation => "deletar essa conversa",
        }
    }
}

/// A user-action failure, already phrased for the agent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The backend answered and refused; `reason` is what it said.
    #[error("Erro ao {}: {reason}", .action.label())]
    Rejected { action: UserAction, reason: String },

    /// The request never reached the backend.
    #[error("Erro de conexão ao {}", .action.label())]
    Connection { action: UserAction },

    /// The action cannot start in the current state.
    #[error("{message}")]
    Precondition { action: UserAction, message: String },
}

/// Fallback reason when the backend gives none.
pub const DEFAULT_REASON: &str = "Tente novamente";

impl ActionError {
    /// Build an action error from the network failure that caused it.
    pub fn from_network(action: UserAction, err: &NetworkError) -> Self {
        match err {
            NetworkError::HttpStatus { message, .. } => ActionError::Rejected {
                action,
                reason: if message.trim().is_empty() {
                    DEFAULT_REASON.to_string()
                } else {
                    message.clone()
                },
            },
            NetworkError::InvalidResponse { .. } => ActionError::Rejected {
                action,
                reason: DEFAULT_REASON.to_string(),
            },
            _ => ActionError::Connection { action },
        }
    }

    pub fn action(&self) -> UserAction {
        match self {
            ActionError::Rejected { action, .. }
            | ActionError::Connection { action }
            | ActionError::Precondition { action, .. } => *action,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ActionError::Rejected { .. } => "E_ACTION_REJECTED",
            ActionError::Connection { .. } => "E_ACTION_CONN",
            ActionError::Precondition { .. } => "E_ACTION_STATE",
        }
    }
}
