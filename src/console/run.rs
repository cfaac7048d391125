use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{Console, NO_OPEN_CHAT};
use crate::config::ConsoleConfig;
use crate::error::{ConsoleResult, StorageError};
use crate::models::ConversationStatus;
use crate::realtime::{RealtimeEvent, RealtimeState};
use crate::traits::{HttpClient, RealtimeConnection};
use crate::view_state::ConsoleView;
use crate::workflow::ClosePath;

/// Something the agent asked the console to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),
    Tab(ConversationStatus),
    /// Status change for the open conversation.
    Status(ConversationStatus),
    Close(ClosePath),
    CancelClose,
    Sticker(PathBuf),
    Audio(PathBuf),
    Favorite {
        url: String,
        message_id: Option<String>,
    },
    Unfavorite(String),
    Favorites,
    /// Send entry `n` (1-based) of the last favorites listing.
    SendFavorite(usize),
    Emoji(String),
    Emojis,
    ClearEmojis,
    Delete(Option<String>),
    Logout,
    Quit,
    Text(String),
}

/// Whether the run loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl<H: HttpClient> Console<H> {
    /// Execute one agent command.
    ///
    /// Failures the agent must see are already queued as alerts when this
    /// returns `Err`.
    pub async fn execute(&mut self, command: Command) -> ConsoleResult<Flow> {
        debug!("Executing {:?}", command);
        match command {
            Command::Open(jid) => self.open_chat(&jid).await?,
            Command::Tab(tab) => {
                self.change_tab(tab).await?;
            }
            Command::Status(to) => {
                let Some(jid) = self.state.current_chat().map(|j| j.to_string()) else {
                    self.view.alert(NO_OPEN_CHAT);
                    return Ok(Flow::Continue);
                };
                self.update_status(&jid, to).await?;
            }
            Command::Close(path) => self.close_conversation(path).await?,
            Command::CancelClose => {
                self.cancel_close();
            }
            Command::Sticker(path) => {
                let data = self.read_file(&path).await?;
                let filename = file_name(&path);
                self.send_sticker(&filename, None, data).await?;
            }
            Command::Audio(path) => {
                let data = self.read_file(&path).await?;
                self.send_audio(data).await?;
            }
            Command::Favorite { url, message_id } => {
                self.save_received_sticker(&url, message_id.as_deref())
                    .await?;
            }
            Command::Unfavorite(url) => self.unfavorite(&url)?,
            Command::Favorites => {
                let catalog = self.favorite_catalog().await?;
                if catalog.is_empty() {
                    self.view.notice("Nenhum sticker favorito");
                }
                for (n, sticker) in catalog.iter().enumerate() {
                    let label = sticker.name.as_deref().unwrap_or(&sticker.url);
                    self.view.notice(format!("{:>3}. {}", n + 1, label));
                }
                self.last_catalog = catalog;
            }
            Command::SendFavorite(n) => {
                let Some(sticker) = n
                    .checked_sub(1)
                    .and_then(|i| self.last_catalog.get(i))
                    .cloned()
                else {
                    self.view.alert(format!("Sticker {} não encontrado", n));
                    return Ok(Flow::Continue);
                };
                self.send_sticker_from_url(&sticker.url, sticker.name.as_deref())
                    .await?;
            }
            Command::Emoji(emoji) => {
                self.send_emoji(&emoji).await?;
            }
            Command::Emojis => {
                let recent = self.recent_emojis();
                if !recent.is_empty() {
                    self.view.notice(recent.join(" "));
                }
            }
            Command::ClearEmojis => self.clear_recent_emojis()?,
            Command::Delete(jid) => self.delete_conversation(jid.as_deref()).await?,
            Command::Logout => {
                self.logout().await;
                return Ok(Flow::Quit);
            }
            Command::Quit => return Ok(Flow::Quit),
            Command::Text(body) => {
                self.send_text(&body).await?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn read_file(&mut self, path: &Path) -> ConsoleResult<Bytes> {
        match tokio::fs::read(path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(source) => {
                let err = StorageError::Read {
                    path: path.to_path_buf(),
                    source,
                };
                self.view.alert(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Drive the console until the agent quits or the session ends.
    ///
    /// `render` is called after every change to the view.
    pub async fn run<F>(
        &mut self,
        config: &ConsoleConfig,
        realtime: Option<&dyn RealtimeConnection>,
        mut commands: mpsc::Receiver<Command>,
        mut render: F,
    ) -> ConsoleResult<()>
    where
        F: FnMut(&mut ConsoleView),
    {
        let mut list_tick = interval(config.list_refresh_interval);
        list_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut chat_tick = interval(config.chat_fallback_interval);
        chat_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut events = realtime.map(|r| r.subscribe());
        let mut states = realtime.map(|r| r.state());
        let connected = states
            .as_ref()
            .map(|rx| rx.borrow().is_connected())
            .unwrap_or(false);
        self.set_realtime_connected(connected);

        render(&mut self.view);
        let mut needs_redraw = false;

        while !self.signed_out {
            tokio::select! {
                _ = list_tick.tick() => {
                    self.refresh_tick().await;
                    needs_redraw = true;
                }
                _ = chat_tick.tick() => {
                    if !self.realtime_connected && self.state.current_chat().is_some() {
                        self.chat_fallback_tick().await;
                        needs_redraw = true;
                    }
                }
                event = next_event(&mut events) => {
                    match event {
                        Ok(event) => {
                            self.handle_realtime_event(event).await;
                            needs_redraw = true;
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Realtime consumer lagged, {} events skipped", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            events = None;
                            self.set_realtime_connected(false);
                        }
                    }
                }
                state = next_state(&mut states) => {
                    match state {
                        Some(state) => self.set_realtime_connected(state.is_connected()),
                        None => {
                            states = None;
                            self.set_realtime_connected(false);
                        }
                    }
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        info!("Input closed");
                        break;
                    };
                    needs_redraw = true;
                    match self.execute(command).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Quit) => break,
                        Err(e) if e.category().alerts_agent() => {
                            debug!("Command failed [{}]: {}", e.category(), e)
                        }
                        Err(e) => warn!("Command failed [{}]: {}", e.category(), e),
                    }
                }
            }

            if needs_redraw {
                render(&mut self.view);
                needs_redraw = false;
            }
        }

        render(&mut self.view);
        if let Some(realtime) = realtime {
            realtime.shutdown();
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

async fn next_event(
    rx: &mut Option<broadcast::Receiver<RealtimeEvent>>,
) -> Result<RealtimeEvent, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_state(rx: &mut Option<watch::Receiver<RealtimeState>>) -> Option<RealtimeState> {
    match rx {
        Some(rx) => match rx.changed().await {
            Ok(()) => Some(rx.borrow_and_update().clone()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}
