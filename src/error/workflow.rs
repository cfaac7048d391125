//! Conversation status workflow errors.

use thiserror::Error;

use crate::models::ConversationStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Transition {from} -> {to} is not allowed")]
    InvalidTransition {
        from: ConversationStatus,
        to: ConversationStatus,
    },

    #[error("Conversation is already {0}")]
    Unchanged(ConversationStatus),

    #[error("No conversation is awaiting close confirmation")]
    NoPendingClose,
}

impl WorkflowError {
    pub fn error_code(&self) -> &'static str {
        match self {
            WorkflowError::InvalidTransition { .. } => "E_FLOW_TRANSITION",
            WorkflowError::Unchanged(_) => "E_FLOW_UNCHANGED",
            WorkflowError::NoPendingClose => "E_FLOW_NO_CLOSE",
        }
    }
}
