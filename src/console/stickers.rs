use tracing::{debug, warn};

use super::{now_ms, Console};
use crate::error::ConsoleResult;
use crate::format::sticker_id_from_url;
use crate::models::CatalogSticker;
use crate::preferences::FavoriteSticker;
use crate::reconcile::Confirmation;
use crate::traits::HttpClient;

pub const ALREADY_FAVORITE: &str = "Este sticker já está salvo nos favoritos!";
pub const STICKER_SAVED: &str = "✅ Sticker salvo! 📌";

impl<H: HttpClient> Console<H> {
    /// Server catalog narrowed to this agent's favorites, most recent first.
    pub async fn favorite_catalog(&mut self) -> ConsoleResult<Vec<CatalogSticker>> {
        let catalog = match self.api.stickers_list().await {
            Ok(catalog) => catalog,
            Err(e) => return Err(self.absorb_auth(e)),
        };
        Ok(self.favorites.filter_catalog(&self.api, catalog).await)
    }

    /// Locally stored favorites, newest first.
    pub fn favorites(&self) -> Vec<FavoriteSticker> {
        self.favorites.list()
    }

    /// Copy a received sticker into the shared catalog and favorite it.
    ///
    /// Returns whether a new favorite was stored.
    pub async fn save_received_sticker(
        &mut self,
        url: &str,
        message_id: Option<&str>,
    ) -> ConsoleResult<bool> {
        if self.session.require_token().is_err() {
            warn!("Not saving sticker: not signed in");
            return Ok(false);
        }
        if self.favorites.contains(&self.api, url).await {
            self.view.alert(ALREADY_FAVORITE);
            return Ok(false);
        }

        let Some(id) = message_id
            .map(str::to_string)
            .or_else(|| sticker_id_from_url(url))
        else {
            warn!("No message id for sticker {}", url);
            return Ok(false);
        };

        let saved = match self.api.save_sticker(&id).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Saving sticker {} failed: {}", id, e);
                return Err(self.absorb_auth(e));
            }
        };
        let added = self
            .favorites
            .add(&self.api, &saved.url, saved.filename.as_deref(), now_ms())
            .await?;
        if added {
            self.view.alert(STICKER_SAVED);
        } else {
            debug!("Sticker {} was already a favorite", saved.url);
        }
        Ok(added)
    }

    pub fn unfavorite(&mut self, url: &str) -> ConsoleResult<()> {
        self.favorites.remove(url)?;
        Ok(())
    }

    /// Record `emoji` as recently used and send it to the open conversation.
    pub async fn send_emoji(&mut self, emoji: &str) -> ConsoleResult<Option<Confirmation>> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Ok(None);
        }
        if let Err(e) = self.emojis.add(emoji) {
            warn!("Recent emojis not saved: {}", e);
        }
        self.send_text(emoji).await
    }

    pub fn recent_emojis(&self) -> Vec<String> {
        self.emojis.list()
    }

    pub fn clear_recent_emojis(&mut self) -> ConsoleResult<()> {
        self.emojis.clear()?;
        Ok(())
    }
}
