//! Unified error handling for the console.
//!
//! - **Error Categories**: classification driving handling decisions
//! - **Domain-specific Errors**: network, auth, user action, storage, workflow
//! - **Unified Error Type**: `ConsoleError` consolidates them
//! - **Error Context**: operation and conversation attached for logs
//! - **Result Type Alias**: `ConsoleResult<T>`
//!
//! | Category | Handling |
//! |----------|----------|
//! | Network | polling paths log and retry next tick |
//! | Auth | session ends, token is dropped |
//! | Server | polling paths retry; actions alert |
//! | Client | invalid data or jid, operation aborted with a warning |
//! | User | alert shown to the agent |
//! | System | local storage problem, logged |

mod action;
mod auth;
mod category;
mod console_error;
mod context;
mod network;
mod result;
mod storage;
mod workflow;

pub use action::{ActionError, UserAction, DEFAULT_REASON};
pub use auth::AuthError;
pub use category::ErrorCategory;
pub use console_error::ConsoleError;
pub use context::ErrorContext;
pub use network::NetworkError;
pub use result::{ConsoleResult, ResultExt};
pub use storage::StorageError;
pub use workflow::WorkflowError;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_error_unification() {
        let net_err: ConsoleError = NetworkError::Timeout {
            operation: "GET /conversations".to_string(),
        }
        .into();
        let auth_err: ConsoleError = AuthError::NotAuthenticated.into();
        let action_err: ConsoleError = ActionError::Connection {
            action: UserAction::SendMessage,
        }
        .into();
        let jid_err = ConsoleError::InvalidJid("undefined".to_string());

        assert_eq!(net_err.category(), ErrorCategory::Network);
        assert_eq!(auth_err.category(), ErrorCategory::Auth);
        assert_eq!(action_err.category(), ErrorCategory::User);
        assert_eq!(jid_err.category(), ErrorCategory::Client);

        for err in [&net_err, &auth_err, &action_err, &jid_err] {
            assert!(!err.error_code().is_empty());
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn test_context_propagation() {
        let err: ConsoleError = NetworkError::ConnectionFailed {
            url: "http://localhost:3000/conversations".to_string(),
            message: "refused".to_string(),
        }
        .into();

        let with_ctx = err.with_context(ErrorContext::new("refresh").with_jid("a@s.whatsapp.net"));

        let ctx = with_ctx.context().unwrap();
        assert_eq!(ctx.operation, "refresh");
        assert_eq!(with_ctx.category(), ErrorCategory::Network);
        assert!(with_ctx.is_retryable());
        assert!(matches!(with_ctx.inner(), ConsoleError::Network(_)));
    }

    #[test]
    fn test_result_ext() {
        fn might_fail() -> ConsoleResult<i32> {
            Err(AuthError::NotAuthenticated.into())
        }

        let err = might_fail()
            .context(ErrorContext::new("initialize"))
            .unwrap_err();
        assert_eq!(err.context().unwrap().operation, "initialize");
        assert!(err.requires_reauth());
    }

    #[test]
    fn test_reauth_detection() {
        let unauthorized: ConsoleError = NetworkError::HttpStatus {
            status: 401,
            message: "Unauthorized".to_string(),
        }
        .into();
        let forbidden: ConsoleError = NetworkError::HttpStatus {
            status: 403,
            message: "Forbidden".to_string(),
        }
        .into();

        assert!(unauthorized.requires_reauth());
        assert!(!forbidden.requires_reauth());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: ConsoleError = json_err.into();
        assert_eq!(err.category(), ErrorCategory::Client);
    }
}
