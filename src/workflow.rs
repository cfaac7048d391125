//! Conversation status workflow.
//!
//! ```text
//!   active ──▶ queue ──▶ active
//!     │          │
//!     └──▶ close confirmation ──▶ closed ──▶ active
//! ```
//!
//! Moving to `closed` never happens directly: it opens a confirmation with
//! three exit paths (see [`ClosePath`]).

use crate::error::WorkflowError;
use crate::models::{ConversationStatus, Jid};

pub const CLOSE_RESOLVED_TEXT: &str = "Obrigado por entrar em contato com nossa empresa! Seu atendimento foi concluído com sucesso. Estamos à disposição sempre que precisar. Tenha um ótimo dia! 😊";
pub const CLOSE_TIMEOUT_TEXT: &str = "Olá! Notamos que você não respondeu nas últimas mensagens. Por conta do tempo de inatividade, este atendimento será encerrado. Caso precise de ajuda novamente, fique à vontade para nos contatar. Até logo! 👋";

/// How a requested status change proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Persist the new status right away.
    Immediate(ConversationStatus),
    /// Open the close confirmation first.
    ConfirmClose,
}

/// Decide how `from -> to` proceeds.
///
/// A conversation with no known status may move anywhere.
pub fn plan(
    from: Option<ConversationStatus>,
    to: ConversationStatus,
) -> Result<Transition, WorkflowError> {
    use ConversationStatus::*;

    if from == Some(to) {
        return Err(WorkflowError::Unchanged(to));
    }
    match (from, to) {
        (Some(Closed), Queue) => Err(WorkflowError::InvalidTransition {
            from: Closed,
            to: Queue,
        }),
        (_, Closed) => Ok(Transition::ConfirmClose),
        (_, target) => Ok(Transition::Immediate(target)),
    }
}

/// Exit paths of the close confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePath {
    /// Close with the "resolved" canned message.
    Resolved,
    /// Close with the inactivity canned message.
    Timeout,
    /// Close without sending anything.
    Silent,
}

impl ClosePath {
    pub fn canned_message(&self) -> Option<&'static str> {
        match self {
            ClosePath::Resolved => Some(CLOSE_RESOLVED_TEXT),
            ClosePath::Timeout => Some(CLOSE_TIMEOUT_TEXT),
            ClosePath::Silent => None,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "resolved" | "success" | "sucesso" => Some(ClosePath::Resolved),
            "timeout" | "demora" => Some(ClosePath::Timeout),
            "silent" | "none" | "sem" => Some(ClosePath::Silent),
            _ => None,
        }
    }
}

/// Conversation awaiting close confirmation, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseConfirmation {
    pending: Option<Jid>,
}

impl CloseConfirmation {
    pub fn open(&mut self, jid: Jid) {
        self.pending = Some(jid);
    }

    pub fn cancel(&mut self) -> Option<Jid> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&Jid> {
        self.pending.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending conversation for one of the exit paths.
    pub fn confirm(&mut self) -> Result<Jid, WorkflowError> {
        self.pending.take().ok_or(WorkflowError::NoPendingClose)
    }
}
