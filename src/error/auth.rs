//! Authentication-related error types.

use thiserror::Error;

/// Authentication-specific error variants.
///
/// Every variant ends the session: the token is dropped and the agent has to
/// log in again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No bearer token is held by the session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Backend answered 401 to an authenticated call.
    #[error("Unauthorized: {endpoint}")]
    Unauthorized { endpoint: String },
}

impl AuthError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::NotAuthenticated => "Você não está logado".to_string(),
            AuthError::Unauthorized { .. } => {
                "Sessão expirada. Faça login novamente.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "E_AUTH_NONE",
            AuthError::Unauthorized { .. } => "E_AUTH_401",
        }
    }
}
