//! Console configuration.
//!
//! Use the builder methods to customize, or [`ConsoleConfig::from_env`] to
//! read overrides from `ZAPDESK_URL`, `ZAPDESK_REALTIME_URL` and
//! `ZAPDESK_DATA_DIR`.
//!
//! # Example
//!
//! ```ignore
//! use zapdesk::config::ConsoleConfig;
//!
//! let config = ConsoleConfig::default()
//!     .with_base_url("http://10.0.0.5:3000")
//!     .with_title("Loja");
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::error::StorageError;
use crate::realtime::RealtimeConfig;

pub const ENV_BASE_URL: &str = "ZAPDESK_URL";
pub const ENV_REALTIME_URL: &str = "ZAPDESK_REALTIME_URL";
pub const ENV_DATA_DIR: &str = "ZAPDESK_DATA_DIR";

const SOCKET_IO_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Backend REST base URL (default: http://localhost:3000)
    pub base_url: String,
    /// Realtime WebSocket URL; derived from `base_url` when unset
    pub realtime_url: Option<String>,
    /// Where the token and preferences are stored; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// Brand in the window title
    pub title: String,
    /// Conversation list poll (default: 2s)
    pub list_refresh_interval: Duration,
    /// Open chat poll while the realtime bridge is down (default: 3s)
    pub chat_fallback_interval: Duration,
    /// Connection status poll while pairing (default: 2s)
    pub pairing_poll_interval: Duration,
    /// Connection status re-check while the link reconnects (default: 3s)
    pub reconnect_check_interval: Duration,
    pub sent_id_ttl: Duration,
    pub sent_id_capacity: usize,
    pub realtime_max_retries: u8,
    pub realtime_max_backoff_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            realtime_url: None,
            data_dir: None,
            title: "Zapdesk".to_string(),
            list_refresh_interval: Duration::from_secs(2),
            chat_fallback_interval: Duration::from_secs(3),
            pairing_poll_interval: Duration::from_secs(2),
            reconnect_check_interval: Duration::from_secs(3),
            sent_id_ttl: DEFAULT_TTL,
            sent_id_capacity: DEFAULT_CAPACITY,
            realtime_max_retries: 5,
            realtime_max_backoff_secs: 30,
        }
    }
}

impl ConsoleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_realtime_url(mut self, url: impl Into<String>) -> Self {
        self.realtime_url = Some(url.into());
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_list_refresh_interval(mut self, interval: Duration) -> Self {
        self.list_refresh_interval = interval;
        self
    }

    pub fn with_chat_fallback_interval(mut self, interval: Duration) -> Self {
        self.chat_fallback_interval = interval;
        self
    }

    pub fn with_pairing_poll_interval(mut self, interval: Duration) -> Self {
        self.pairing_poll_interval = interval;
        self
    }

    pub fn with_reconnect_check_interval(mut self, interval: Duration) -> Self {
        self.reconnect_check_interval = interval;
        self
    }

    pub fn with_sent_ids(mut self, ttl: Duration, capacity: usize) -> Self {
        self.sent_id_ttl = ttl;
        self.sent_id_capacity = capacity;
        self
    }

    /// Defaults overridden by the `ZAPDESK_*` environment variables. Empty
    /// values are ignored.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(url) = var(ENV_BASE_URL) {
            config = config.with_base_url(url);
        }
        if let Some(url) = var(ENV_REALTIME_URL) {
            config = config.with_realtime_url(url);
        }
        if let Some(dir) = var(ENV_DATA_DIR) {
            config = config.with_data_dir(dir);
        }
        config
    }

    /// Explicit realtime URL, or the Socket.IO endpoint on the backend host.
    pub fn realtime_url(&self) -> String {
        if let Some(url) = &self.realtime_url {
            return url.clone();
        }
        let base = self.base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            format!("ws://{}", base)
        };
        format!("{}{}", ws_base, SOCKET_IO_PATH)
    }

    pub fn realtime_config(&self) -> RealtimeConfig {
        RealtimeConfig {
            max_retries: self.realtime_max_retries,
            max_backoff_secs: self.realtime_max_backoff_secs,
            ..RealtimeConfig::new(self.realtime_url())
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, StorageError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join("zapdesk"))
                .ok_or(StorageError::NoDataDir),
        }
    }
}
