//! WhatsApp link bootstrap.
//!
//! Before the console starts, the backend's link to WhatsApp must be up:
//!
//! 1. `GET /status` while it reports `reconectando`, every
//!    `reconnect_check_interval`
//! 2. `desconectado` means the link needs pairing: fetch `GET /qr` once and
//!    show it, then poll `GET /status` every `pairing_poll_interval` until
//!    `conectado`

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::api::BackendClient;
use crate::config::ConsoleConfig;
use crate::error::ConsoleResult;
use crate::format::qr_image_url;
use crate::models::ConnectionStatus;
use crate::traits::HttpClient;

/// QR code to scan from the phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingCode {
    pub qr: String,
    pub image_url: String,
}

impl PairingCode {
    pub fn new(qr: impl Into<String>) -> Self {
        let qr = qr.into();
        Self {
            image_url: qr_image_url(&qr),
            qr,
        }
    }
}

/// Link state once the startup check settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCheck {
    Connected,
    NeedsPairing,
}

/// `GET /status`, re-checked while the link is reconnecting.
///
/// Unknown statuses are treated as connected; the console's own polling
/// surfaces any real problem.
pub async fn check_connection<H: HttpClient>(
    api: &BackendClient<H>,
    retry_every: Duration,
) -> ConsoleResult<LinkCheck> {
    loop {
        match api.connection_status().await? {
            ConnectionStatus::Connected => return Ok(LinkCheck::Connected),
            ConnectionStatus::Disconnected => return Ok(LinkCheck::NeedsPairing),
            ConnectionStatus::Reconnecting => {
                debug!("Link reconnecting, checking again in {:?}", retry_every);
                sleep(retry_every).await;
            }
            ConnectionStatus::Unknown(status) => {
                warn!("Unknown link status '{}'", status);
                return Ok(LinkCheck::Connected);
            }
        }
    }
}

/// Fetch the pairing QR code.
pub async fn fetch_pairing_code<H: HttpClient>(api: &BackendClient<H>) -> ConsoleResult<PairingCode> {
    let qr = api.qr_code().await?;
    info!("Pairing code received");
    Ok(PairingCode::new(qr))
}

/// Poll `GET /status` until the link is connected.
///
/// Transient failures are logged and polled again. Returns the number of
/// polls it took.
pub async fn wait_until_paired<H: HttpClient>(
    api: &BackendClient<H>,
    poll_every: Duration,
    mut on_status: impl FnMut(&ConnectionStatus),
) -> ConsoleResult<u32> {
    let mut polls = 0u32;
    loop {
        polls += 1;
        match api.connection_status().await {
            Ok(ConnectionStatus::Connected) => {
                info!("Link connected after {} polls", polls);
                on_status(&ConnectionStatus::Connected);
                return Ok(polls);
            }
            Ok(status) => on_status(&status),
            Err(e) if e.requires_reauth() => return Err(e),
            Err(e) => warn!("Status poll failed: {}", e),
        }
        sleep(poll_every).await;
    }
}

/// Full startup check: wait out reconnects, pair when needed.
///
/// `on_pairing` is called once with the QR code to show.
pub async fn ensure_linked<H: HttpClient>(
    api: &BackendClient<H>,
    config: &ConsoleConfig,
    on_pairing: impl FnOnce(&PairingCode),
    on_status: impl FnMut(&ConnectionStatus),
) -> ConsoleResult<()> {
    if check_connection(api, config.reconnect_check_interval).await? == LinkCheck::Connected {
        return Ok(());
    }
    let code = fetch_pairing_code(api).await?;
    on_pairing(&code);
    wait_until_paired(api, config.pairing_poll_interval, on_status).await?;
    Ok(())
}
