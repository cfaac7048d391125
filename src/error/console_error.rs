//! Unified error type for the console.

use std::fmt;

use super::action::ActionError;
use super::auth::AuthError;
use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::storage::StorageError;
use super::workflow::WorkflowError;

/// Unified error type for the console.
///
/// Consolidates the domain-specific errors so that callers can decide, per
/// category, whether to log and retry, end the session, or alert the agent.
#[derive(Debug)]
pub enum ConsoleError {
    /// Backend call failed (transport or non-2xx).
    Network(NetworkError),

    /// Session is not (or no longer) authenticated.
    Auth(AuthError),

    /// An agent-initiated action failed; the text is shown as an alert.
    Action(ActionError),

    /// A conversation identifier was empty, `"undefined"` or `"null"`.
    InvalidJid(String),

    /// Local preference storage failed.
    Storage(StorageError),

    /// Status workflow refused the request.
    Workflow(WorkflowError),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<ConsoleError>,
        context: ErrorContext,
    },
}

impl ConsoleError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConsoleError::Network(NetworkError::HttpStatus { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            ConsoleError::Network(NetworkError::HttpStatus { .. }) => ErrorCategory::Client,
            ConsoleError::Network(NetworkError::InvalidResponse { .. }) => ErrorCategory::Client,
            ConsoleError::Network(_) => ErrorCategory::Network,
            ConsoleError::Auth(_) => ErrorCategory::Auth,
            ConsoleError::Action(_) => ErrorCategory::User,
            ConsoleError::InvalidJid(_) => ErrorCategory::Client,
            ConsoleError::Storage(_) => ErrorCategory::System,
            ConsoleError::Workflow(_) => ErrorCategory::User,
            ConsoleError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConsoleError::Network(err) => err.is_retryable(),
            ConsoleError::WithContext { error, .. } => error.is_retryable(),
            _ => false,
        }
    }

    /// Check if this error must end the session.
    pub fn requires_reauth(&self) -> bool {
        match self {
            ConsoleError::Auth(_) => true,
            ConsoleError::Network(NetworkError::HttpStatus { status: 401, .. }) => true,
            ConsoleError::WithContext { error, .. } => error.requires_reauth(),
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Network(err) => err.user_message(),
            ConsoleError::Auth(err) => err.user_message(),
            ConsoleError::Action(err) => err.to_string(),
            ConsoleError::InvalidJid(_) => "Erro: Conversa inválida".to_string(),
            ConsoleError::Storage(err) => err.to_string(),
            ConsoleError::Workflow(err) => err.to_string(),
            ConsoleError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::Network(err) => err.error_code(),
            ConsoleError::Auth(err) => err.error_code(),
            ConsoleError::Action(err) => err.error_code(),
            ConsoleError::InvalidJid(_) => "E_JID_INVALID",
            ConsoleError::Storage(err) => err.error_code(),
            ConsoleError::Workflow(err) => err.error_code(),
            ConsoleError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        ConsoleError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ConsoleError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &ConsoleError {
        match self {
            ConsoleError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Network(err) => write!(f, "{}", err),
            ConsoleError::Auth(err) => write!(f, "{}", err),
            ConsoleError::Action(err) => write!(f, "{}", err),
            ConsoleError::InvalidJid(raw) => write!(f, "Invalid jid: {:?}", raw),
            ConsoleError::Storage(err) => write!(f, "{}", err),
            ConsoleError::Workflow(err) => write!(f, "{}", err),
            ConsoleError::WithContext { error, context } => write!(f, "{}: {}", context, error),
        }
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConsoleError::Network(err) => Some(err),
            ConsoleError::Auth(err) => Some(err),
            ConsoleError::Action(err) => Some(err),
            ConsoleError::Storage(err) => Some(err),
            ConsoleError::Workflow(err) => Some(err),
            ConsoleError::InvalidJid(_) => None,
            ConsoleError::WithContext { error, .. } => error.source(),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<NetworkError> for ConsoleError {
    fn from(err: NetworkError) -> Self {
        ConsoleError::Network(err)
    }
}

impl From<AuthError> for ConsoleError {
    fn from(err: AuthError) -> Self {
        ConsoleError::Auth(err)
    }
}

impl From<ActionError> for ConsoleError {
    fn from(err: ActionError) -> Self {
        ConsoleError::Action(err)
    }
}

impl From<StorageError> for ConsoleError {
    fn from(err: StorageError) -> Self {
        ConsoleError::Storage(err)
    }
}

impl From<WorkflowError> for ConsoleError {
    fn from(err: WorkflowError) -> Self {
        ConsoleError::Workflow(err)
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}
