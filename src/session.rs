//! Session and auth holder.
//!
//! The bearer token lives in memory, seeded from the key-value store under
//! [`TOKEN_KEY`]. Logging out drops it from both places.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{AuthError, StorageError};
use crate::models::{MeResponse, RoleSet};
use crate::traits::KeyValueStore;

pub const TOKEN_KEY: &str = "token";

/// Who is logged in, as reported by `GET /me`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentIdentity {
    pub username: String,
    pub roles: RoleSet,
}

impl From<MeResponse> for AgentIdentity {
    fn from(me: MeResponse) -> Self {
        Self {
            roles: me.roles(),
            username: me.username,
        }
    }
}

pub struct Session {
    store: Arc<dyn KeyValueStore>,
    token: Option<String>,
    identity: Option<AgentIdentity>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.token.is_some())
            .field("identity", &self.identity)
            .finish()
    }
}

impl Session {
    /// Seed the session from the persisted token, if any.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let token = store.get(TOKEN_KEY)?.filter(|t| !t.trim().is_empty());
        debug!("Session loaded, token present: {}", token.is_some());
        Ok(Self {
            store,
            token,
            identity: None,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Store a new token in memory and on disk.
    pub fn login(&mut self, token: impl Into<String>) -> Result<(), StorageError> {
        let token = token.into();
        self.store.set(TOKEN_KEY, &token)?;
        self.token = Some(token);
        self.identity = None;
        info!("Session token stored");
        Ok(())
    }

    /// Drop the token everywhere. A storage failure is logged; the in-memory
    /// session is cleared regardless.
    pub fn logout(&mut self) {
        self.token = None;
        self.identity = None;
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            warn!("Failed to remove persisted token: {}", e);
        }
        info!("Session cleared");
    }

    /// Token, or [`AuthError::NotAuthenticated`] when logged out.
    pub fn require_token(&self) -> Result<&str, AuthError> {
        self.token.as_deref().ok_or(AuthError::NotAuthenticated)
    }

    pub fn identity(&self) -> Option<&AgentIdentity> {
        self.identity.as_ref()
    }

    pub fn set_identity(&mut self, identity: AgentIdentity) {
        self.identity = Some(identity);
    }

    pub fn roles(&self) -> RoleSet {
        self.identity
            .as_ref()
            .map(|i| i.roles)
            .unwrap_or_default()
    }
}
