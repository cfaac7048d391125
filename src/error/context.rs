//! Where a failure happened: the operation and, when known, the conversation.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Short operation label, e.g. `"refresh active tab"`.
    pub operation: String,
    pub jid: Option<String>,
    pub at: DateTime<Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            jid: None,
            at: Utc::now(),
        }
    }

    pub fn with_jid(mut self, jid: impl Into<String>) -> Self {
        self.jid = Some(jid.into());
        self
    }

    /// `key=value` form for structured log lines.
    pub fn to_log_string(&self) -> String {
        let jid = self
            .jid
            .as_deref()
            .map(|jid| format!(" jid={}", jid))
            .unwrap_or_default();
        format!("operation={}{} at={}", self.operation, jid, self.at.to_rfc3339())
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.jid {
            Some(jid) => write!(f, "{} ({})", self.operation, jid),
            None => f.write_str(&self.operation),
        }
    }
}
