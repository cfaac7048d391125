//! Coarse buckets for console failures.
//!
//! The polling ticks swallow transient buckets and try again on the next
//! interval, `Auth` ends the session, and the rest reach the agent as an
//! alert.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Backend unreachable or the request timed out.
    Network,
    /// Token missing, rejected or expired.
    Auth,
    /// Backend answered 5xx.
    Server,
    /// Bad payload or identifier on our side of the wire.
    Client,
    /// Something the agent has to act on (pick a chat, confirm a close).
    User,
    /// Data directory or preference file trouble.
    System,
}

impl ErrorCategory {
    /// Transient buckets are retried silently by the next poll.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }

    /// Whether a failure in this bucket is shown to the agent as an alert
    /// instead of only being logged.
    pub fn alerts_agent(self) -> bool {
        matches!(self, Self::User | Self::Client)
    }

    /// Tag used in log lines, e.g. `[network]`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Server => "server",
            Self::Client => "client",
            Self::User => "user",
            Self::System => "system",
        }
    }

    /// One-line hint printed under a fatal startup error.
    pub fn recovery_hint(self) -> &'static str {
        match self {
            Self::Network => "Verifique sua conexão e tente novamente",
            Self::Auth => "Faça login novamente",
            Self::Server => "O servidor está instável, tente novamente em instantes",
            Self::Client => "Dados inválidos recebidos do servidor",
            Self::User => "Tente novamente",
            Self::System => "Verifique as permissões do diretório de dados",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
