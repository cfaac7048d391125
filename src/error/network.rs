//! Network-related error types.
//!
//! Failures of backend calls: transport problems and non-2xx answers.

use thiserror::Error;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    /// Connection to the backend failed.
    #[error("Connection failed to '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    #[error("{operation} timed out")]
    Timeout { operation: String },

    /// Non-2xx response. `message` carries the backend-provided reason.
    #[error("HTTP {status} error: {message}")]
    HttpStatus { status: u16, message: String },

    /// Body could not be decoded into the expected payload.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Anything else the transport reported.
    #[error("Network error: {message}")]
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } | NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::InvalidResponse { .. } | NetworkError::Other { .. } => false,
        }
    }

    /// True when the request never produced an HTTP answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            NetworkError::ConnectionFailed { .. }
                | NetworkError::Timeout { .. }
                | NetworkError::Other { .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Não foi possível conectar ao servidor.".to_string()
            }
            NetworkError::Timeout { .. } => "O servidor demorou demais para responder.".to_string(),
            NetworkError::HttpStatus { status, message } => match *status {
                401 => "Sessão expirada. Faça login novamente.".to_string(),
                404 => "Recurso não encontrado.".to_string(),
                500..=599 => "O servidor está com problemas. Tente novamente.".to_string(),
                _ => message.clone(),
            },
            NetworkError::InvalidResponse { .. } => "Resposta inválida do servidor.".to_string(),
            NetworkError::Other { message } => format!("Erro de rede: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }

    /// Classify a transport-level failure reported by an [`HttpClient`](crate::traits::HttpClient).
    pub fn from_http(err: HttpError, url: &str) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
                url: url.to_string(),
                message,
            },
            HttpError::Timeout(_) => NetworkError::Timeout {
                operation: format!("request to {}", url),
            },
            HttpError::InvalidUrl(message) => NetworkError::Other {
                message: format!("invalid URL {}: {}", url, message),
            },
            HttpError::Other(message) => NetworkError::Other { message },
        }
    }
}
