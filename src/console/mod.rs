//! Console orchestration.
//!
//! [`Console`] owns the session, the backend client, the UI state and the
//! rendered view, and drives every agent action and background tick:
//!
//! - `messaging`: opening a chat, optimistic sends, fallback chat refresh
//! - `list_sync`: conversation list polling, tabs, unread total
//! - `status`: status workflow, close paths, deletion
//! - `stickers`: favorites and recent emojis
//! - `events`: realtime event dispatch
//! - `run`: the select loop tying timers, realtime and commands together
//!
//! All methods take `&mut self`, so a fetch and the code applying its result
//! run without another operation in between. A realtime message is routed
//! against the conversation open at the moment it is handled.

mod events;
mod list_sync;
mod messaging;
mod run;
mod status;
mod stickers;

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::BackendClient;
use crate::config::ConsoleConfig;
use crate::error::{ActionError, AuthError, ConsoleError, ConsoleResult, UserAction};
use crate::format::capitalize_first;
use crate::models::CatalogSticker;
use crate::preferences::{FavoriteStickers, RecentEmojis};
use crate::session::{AgentIdentity, Session};
use crate::state::UiState;
use crate::traits::{HttpClient, KeyValueStore};
use crate::view_state::ConsoleView;

pub use run::{Command, Flow};
pub use status::{DELETED, NOT_FOUND};
pub use stickers::{ALREADY_FAVORITE, STICKER_SAVED};

pub const NO_OPEN_CHAT: &str = "Nenhuma conversa aberta";

pub struct Console<H: HttpClient> {
    api: BackendClient<H>,
    session: Session,
    state: UiState,
    view: ConsoleView,
    emojis: RecentEmojis,
    favorites: FavoriteStickers,
    /// Catalog from the last `/favorites` listing, for `/favsend <n>`.
    last_catalog: Vec<CatalogSticker>,
    realtime_connected: bool,
    signed_out: bool,
}

impl<H: HttpClient> Console<H> {
    /// Build a console whose session is seeded from `store`.
    pub fn new(config: &ConsoleConfig, http: H, store: Arc<dyn KeyValueStore>) -> ConsoleResult<Self> {
        let session = Session::load(store.clone())?;
        let mut api = BackendClient::new(config.base_url.clone(), http);
        api.set_auth_token(session.token().map(str::to_string));

        Ok(Self {
            api,
            session,
            state: UiState::new(config.sent_id_ttl, config.sent_id_capacity),
            view: ConsoleView::new(config.title.clone()),
            emojis: RecentEmojis::new(store.clone()),
            favorites: FavoriteStickers::new(store),
            last_catalog: Vec::new(),
            realtime_connected: false,
            signed_out: false,
        })
    }

    pub fn view(&self) -> &ConsoleView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ConsoleView {
        &mut self.view
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api(&self) -> &BackendClient<H> {
        &self.api
    }

    /// Whether the session ended (logout or rejected token).
    pub fn is_signed_out(&self) -> bool {
        self.signed_out
    }

    pub fn realtime_connected(&self) -> bool {
        self.realtime_connected
    }

    pub fn set_realtime_connected(&mut self, connected: bool) {
        if self.realtime_connected != connected {
            info!(
                "Realtime bridge {}",
                if connected { "connected" } else { "down, polling open chat" }
            );
        }
        self.realtime_connected = connected;
    }

    /// Store a new token and start over.
    pub fn login(&mut self, token: &str) -> ConsoleResult<()> {
        self.session.login(token)?;
        self.api.set_auth_token(Some(token.to_string()));
        self.signed_out = false;
        Ok(())
    }

    /// Load the agent identity and the first conversation list.
    pub async fn initialize(&mut self) -> ConsoleResult<()> {
        if !self.session.is_authenticated() {
            self.end_session();
            return Err(AuthError::NotAuthenticated.into());
        }

        let me = match self.api.me().await {
            Ok(me) => me,
            Err(e) => return Err(self.absorb_auth(e)),
        };
        let identity = AgentIdentity::from(me);
        info!(
            "Signed in as {} (admin: {})",
            identity.username,
            identity.roles.is_admin()
        );
        self.session.set_identity(identity);

        self.refresh_list().await?;
        self.refresh_unread().await;
        Ok(())
    }

    /// Best-effort `POST /logout`, then drop the token.
    pub async fn logout(&mut self) {
        if self.session.is_authenticated() {
            if let Err(e) = self.api.logout().await {
                warn!("Logout request failed: {}", e);
            }
        }
        self.end_session();
    }

    fn end_session(&mut self) {
        if !self.signed_out {
            info!("Session ended");
        }
        self.session.logout();
        self.api.set_auth_token(None);
        self.state.close_chat();
        self.state.close.cancel();
        self.view.clear_chat();
        self.view.list.clear();
        self.signed_out = true;
    }

    /// End the session when `err` is an auth failure. Returns `err`.
    fn absorb_auth(&mut self, err: ConsoleError) -> ConsoleError {
        if err.requires_reauth() {
            warn!("Backend rejected the session: {}", err);
            self.end_session();
        }
        err
    }

    /// Token check for agent actions: alerts when missing.
    fn require_token(&mut self) -> ConsoleResult<()> {
        match self.session.require_token() {
            Ok(_) => Ok(()),
            Err(e) => {
                self.view.alert(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Turn a failed agent action into an alert.
    ///
    /// Auth failures end the session instead.
    fn action_failed(&mut self, action: UserAction, err: ConsoleError) -> ConsoleError {
        if err.requires_reauth() {
            return self.absorb_auth(err);
        }
        let action_err = match err.inner() {
            ConsoleError::Network(net) => ActionError::from_network(action, net),
            ConsoleError::Action(inner) => inner.clone(),
            other => ActionError::Precondition {
                action,
                message: other.user_message(),
            },
        };
        warn!("{} failed: {}", action.label(), err);
        self.view.alert(action_err.to_string());
        action_err.into()
    }

    fn precondition(&mut self, action: UserAction, message: &str) -> ConsoleError {
        self.view.alert(message);
        ActionError::Precondition {
            action,
            message: message.to_string(),
        }
        .into()
    }

    /// Name signed on outgoing text, from `GET /me` (fetched once).
    async fn agent_name(&mut self) -> ConsoleResult<String> {
        if let Some(identity) = self.session.identity() {
            return Ok(capitalize_first(&identity.username));
        }
        let me = match self.api.me().await {
            Ok(me) => me,
            Err(e) => return Err(self.absorb_auth(e)),
        };
        let identity = AgentIdentity::from(me);
        let name = capitalize_first(&identity.username);
        self.session.set_identity(identity);
        Ok(name)
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
